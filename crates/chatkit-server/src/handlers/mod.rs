pub mod chatkit;
