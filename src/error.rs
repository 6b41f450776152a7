use notice_center_util::Exception;
use std::{borrow::Cow, fmt};

/// Notice creation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoticeError {
    /// A persistent notice was requested while the quota is already used up
    PersistentQuotaExceeded { limit: u32 },
    /// The store already holds a notice with this identifier
    DuplicateId(u32),
    /// Every identifier has been handed out
    IdsExhausted,
}

impl fmt::Display for NoticeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoticeError::PersistentQuotaExceeded { limit } => {
                write!(f, "Too many persistent notices (limit is {})", limit)
            }
            NoticeError::DuplicateId(id) => write!(f, "Notice id {} is already in use", id),
            NoticeError::IdsExhausted => write!(f, "No notice identifiers left"),
        }
    }
}

impl std::error::Error for NoticeError {}

impl Exception for NoticeError {
    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed(match self {
            NoticeError::PersistentQuotaExceeded { .. } => "PersistentQuotaExceeded",
            NoticeError::DuplicateId(_) => "DuplicateId",
            NoticeError::IdsExhausted => "IdsExhausted",
        })
    }
}
