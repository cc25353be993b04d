mod common;

mod compliance;
mod directory;
