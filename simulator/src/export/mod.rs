pub mod drive;

pub use drive::DriveProvider;
