pub mod fixtures;

#[cfg(test)]
mod auth_tests;
#[cfg(test)]
mod waitlist_tests;
#[cfg(test)]
mod ambassador_tests;
#[cfg(test)]
mod order_tests;
#[cfg(test)]
mod reward_tests;
#[cfg(test)]
mod render_tests;
#[cfg(test)]
mod dashboard_tests;
