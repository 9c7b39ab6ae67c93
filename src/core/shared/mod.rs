pub mod html;
pub mod schema;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod utils;

pub use schema::*;

pub use utils::{create_conn, run_migrations, with_connection, DbPool, DbTaskError};
