pub mod form;
pub mod host_table;
pub mod popup;
pub mod transfer;

pub use form::{HostForm, draw_host_form_popup};
pub use host_table::{HostListState, draw_host_table};
pub use popup::{
    draw_busy_popup, draw_command_output, draw_command_prompt, draw_delete_confirmation_popup,
    draw_error_popup, draw_info_popup,
};
pub use transfer::{TransferForm, draw_transfer_popup};
