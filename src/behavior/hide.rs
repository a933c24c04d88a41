use super::{ItemStore, Journal, ResultBehavior, ResultMode};

/// Hides matching items, leaving the rest visible.
#[derive(Debug, Default)]
pub struct HideBehavior {
    journal: Journal,
}

impl ResultBehavior for HideBehavior {
    fn mode(&self) -> ResultMode {
        ResultMode::Hide
    }

    fn filter(&mut self, all_items: &ItemStore, filtered: &[String]) {
        self.journal
            .apply(all_items, filtered, |item, matched| item.visible = !matched);
    }

    fn cancel_filtration(&mut self) {
        self.journal.undo();
    }

    fn is_applied(&self) -> bool {
        self.journal.is_applied()
    }
}
