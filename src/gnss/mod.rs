
/// This module contains the acquisition search, generalized over signal types, and its parallel dispatcher
pub mod acquisition;

/// Signal-type descriptors and the replica code interface
pub mod signal;

pub mod shift_register;

pub mod beidou_b1i;
pub mod galileo_e1c;
pub mod gps_l1_ca;
pub mod gps_l2c;
