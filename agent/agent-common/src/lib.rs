/*!

Code shared by agents and the harness that runs them.

!*/

pub mod secrets;
