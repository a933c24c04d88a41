use super::{ItemStore, Journal, ResultBehavior, ResultMode};

/// Keeps only matching items visible.
#[derive(Debug, Default)]
pub struct ShowBehavior {
    journal: Journal,
}

impl ResultBehavior for ShowBehavior {
    fn mode(&self) -> ResultMode {
        ResultMode::Show
    }

    fn filter(&mut self, all_items: &ItemStore, filtered: &[String]) {
        self.journal
            .apply(all_items, filtered, |item, matched| item.visible = matched);
    }

    fn cancel_filtration(&mut self) {
        self.journal.undo();
    }

    fn is_applied(&self) -> bool {
        self.journal.is_applied()
    }
}
