#[cfg(feature = "defmt")]
macro_rules! error {
    ($($t:tt)*) => {{ defmt::error!($($t)*); }};
}

#[cfg(feature = "defmt")]
macro_rules! warn {
    ($($t:tt)*) => {{ defmt::warn!($($t)*); }};
}

#[cfg(feature = "defmt")]
macro_rules! debug {
    ($($t:tt)*) => {{ defmt::debug!($($t)*); }};
}

#[cfg(all(feature = "log", not(feature = "defmt")))]
macro_rules! error {
    ($($t:tt)*) => {{ ::log::error!($($t)*); }};
}

#[cfg(all(feature = "log", not(feature = "defmt")))]
macro_rules! warn {
    ($($t:tt)*) => {{ ::log::warn!($($t)*); }};
}

#[cfg(all(feature = "log", not(feature = "defmt")))]
macro_rules! debug {
    ($($t:tt)*) => {{ ::log::debug!($($t)*); }};
}

#[cfg(not(any(feature = "defmt", feature = "log")))]
macro_rules! error {
    ($($t:tt)*) => {{ let _ = format_args!($($t)*); }};
}

#[cfg(not(any(feature = "defmt", feature = "log")))]
macro_rules! warn {
    ($($t:tt)*) => {{ let _ = format_args!($($t)*); }};
}

#[cfg(not(any(feature = "defmt", feature = "log")))]
macro_rules! debug {
    ($($t:tt)*) => {{ let _ = format_args!($($t)*); }};
}
