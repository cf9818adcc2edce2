use anyhow::Result;
use mfstage_core::LocalNode;

/// Declarative assertions on namespace state
pub enum Assertion {
    // Content
    Content {
        path: String,
        content: Vec<u8>,
    },
    ContentMatchesFixture {
        path: String,
        fixture: String,
        file: String,
    },

    // Existence
    Exists {
        path: String,
    },
    Absent {
        path: String,
    },

    // Hashes
    HashEquals {
        path: String,
        label: String,
    },
    HashDiffers {
        path: String,
        label: String,
    },
    RememberedContent {
        label: String,
        child: Option<String>,
        content: Vec<u8>,
    },

    // Root tracking
    RootMatchesStat,
    RootStale,

    // Accounts
    AccountExists {
        id: String,
    },

    // Local artifacts
    ScratchEmpty,

    // Custom (sees the node directly, bypassing the namespace)
    Custom(Box<dyn Fn(&LocalNode) -> Result<()> + Send + Sync>),
}

impl std::fmt::Debug for Assertion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Content { path, content } => write!(
                f,
                "Content {{ path: {:?}, content: {} bytes }}",
                path,
                content.len()
            ),
            Self::ContentMatchesFixture {
                path,
                fixture,
                file,
            } => write!(
                f,
                "ContentMatchesFixture {{ path: {:?}, fixture: {:?}, file: {:?} }}",
                path, fixture, file
            ),
            Self::Exists { path } => write!(f, "Exists {{ path: {:?} }}", path),
            Self::Absent { path } => write!(f, "Absent {{ path: {:?} }}", path),
            Self::HashEquals { path, label } => {
                write!(f, "HashEquals {{ path: {:?}, label: {:?} }}", path, label)
            }
            Self::HashDiffers { path, label } => {
                write!(f, "HashDiffers {{ path: {:?}, label: {:?} }}", path, label)
            }
            Self::RememberedContent {
                label,
                child,
                content,
            } => write!(
                f,
                "RememberedContent {{ label: {:?}, child: {:?}, content: {} bytes }}",
                label,
                child,
                content.len()
            ),
            Self::RootMatchesStat => write!(f, "RootMatchesStat"),
            Self::RootStale => write!(f, "RootStale"),
            Self::AccountExists { id } => write!(f, "AccountExists({:?})", id),
            Self::ScratchEmpty => write!(f, "ScratchEmpty"),
            Self::Custom(_) => write!(f, "Custom(<fn>)"),
        }
    }
}
