// Terminal front end for the Rax engine: argument parsing helpers and
// plain-text report rendering.

pub mod picks;
pub mod report;
