use super::{ItemStore, Journal, ResultBehavior, ResultMode};

/// Marks matching items without hiding anything.
#[derive(Debug, Default)]
pub struct HighlightBehavior {
    journal: Journal,
}

impl ResultBehavior for HighlightBehavior {
    fn mode(&self) -> ResultMode {
        ResultMode::Highlight
    }

    fn filter(&mut self, all_items: &ItemStore, filtered: &[String]) {
        self.journal
            .apply(all_items, filtered, |item, matched| item.highlighted = matched);
    }

    fn cancel_filtration(&mut self) {
        self.journal.undo();
    }

    fn is_applied(&self) -> bool {
        self.journal.is_applied()
    }
}
