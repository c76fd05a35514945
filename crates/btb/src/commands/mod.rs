pub mod fs;
pub mod run;
