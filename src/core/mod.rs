// Domain-layer modules and shared errors/models
pub mod validation {
    pub use crate::validation::*;
}

pub mod submitter {
    pub use crate::submitter::*;
}

pub mod models {
    pub use crate::models::*;
}

pub mod errors {
    pub use crate::errors::*;
}
