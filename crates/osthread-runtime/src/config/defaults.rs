//! Compile-time defaults, merged by build.rs from the library values and
//! the optional user file named by `OST_CONFIG_RS`.

include!(concat!(env!("OUT_DIR"), "/ost_merged_config.rs"));
