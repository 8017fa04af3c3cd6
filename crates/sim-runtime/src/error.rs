use thiserror::Error;

/// Rejected portfolio actions. None of them changes any state.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PortfolioError {
    #[error("no business at index {index} (have {len})")]
    InvalidIndex { index: usize, len: usize },

    #[error("insufficient funds: need ${required:.2}, have ${available:.2}")]
    InsufficientFunds { required: f64, available: f64 },

    #[error("business {index} already has a manager")]
    AlreadyManaged { index: usize },

    #[error("quantity must be at least 1")]
    ZeroQuantity,
}
