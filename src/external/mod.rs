pub mod line;
pub mod supabase;

pub use line::*;
pub use supabase::*;
