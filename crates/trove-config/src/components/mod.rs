//! Configuration components
//!
//! One module per concern the query service needs configured.

pub mod endpoints;
pub mod logging;
pub mod paging;
pub mod search;

pub use endpoints::*;
pub use logging::*;
pub use paging::*;
pub use search::*;
