pub mod racesim_interface;
