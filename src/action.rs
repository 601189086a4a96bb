use crate::error::PagerError;
use crate::types::Repository;

#[derive(Debug, Clone)]
pub enum Action {
    Quit,

    // Paging
    PrevPage,
    NextPage,
    FirstPage,
    LastPage,
    ScrollUp,
    ScrollDown,

    // Chrome
    NavigateUp,
    OpenInBrowser,

    // Close / reopen confirmation
    ShowStateConfirm,
    ConfirmYes,
    ConfirmNo,

    // Async results
    RepositoryLoaded(Result<Box<Repository>, String>),
    PageLoaded {
        index: usize,
        result: Result<(), String>,
    },

    Error(String),
    None,
}

impl From<PagerError> for Action {
    fn from(err: PagerError) -> Self {
        Action::Error(err.to_string())
    }
}
