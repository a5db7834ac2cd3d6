pub mod check_out_asset_cmd;
pub mod check_in_asset_cmd;
pub mod place_hold_cmd;
pub mod mark_lost_cmd;
pub mod mark_found_cmd;
pub mod get_circulation_cmd;
