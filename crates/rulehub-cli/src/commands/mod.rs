mod args;
pub mod reconcile;
pub mod serve;

pub use reconcile::ReconcileMediaCommand;
pub use serve::ServeCommand;
