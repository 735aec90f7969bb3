//! Change notification for worksheet mutations.
//!
//! Every store operation computes its full result, then notifies exactly
//! once. The owner (session, CLI) persists from inside the callback.

use std::sync::{Arc, Mutex};

use crate::worksheet::Worksheet;

/// Callback invoked after each completed mutation.
pub type ChangeCallback = Box<dyn FnMut(&Worksheet) + Send>;

/// Shape snapshot captured per notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeNotice {
    pub columns: usize,
    pub rows: usize,
}

/// Simple notification collector for testing.
#[derive(Default, Clone)]
pub struct ChangeCollector {
    notices: Arc<Mutex<Vec<ChangeNotice>>>,
}

impl ChangeCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// A callback that records one notice per notification.
    pub fn callback(&self) -> ChangeCallback {
        let notices = Arc::clone(&self.notices);
        Box::new(move |sheet| {
            notices.lock().unwrap().push(ChangeNotice {
                columns: sheet.columns.len(),
                rows: sheet.rows.len(),
            });
        })
    }

    pub fn notices(&self) -> Vec<ChangeNotice> {
        self.notices.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.notices.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
