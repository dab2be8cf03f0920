mod common;
mod features;
mod fusion;
