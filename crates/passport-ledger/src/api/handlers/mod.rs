//! API request handlers

pub mod dpp;
pub mod invoke;

pub use dpp::{
    create_dpp, create_dpp_unsigned, delete_dpp, dpp_exists, list_dpps, read_dpp, transfer_dpp,
    transfer_dpp_unsigned, update_dpp, update_dpp_unsigned, CreateDppRequest, DeleteDppResponse,
    ExistsResponse, ListDppsQuery, ListDppsResponse, TransferDppRequest, UnsignedCreateRequest,
    UnsignedTransferRequest, UpdateDppRequest,
};
pub use invoke::{invoke, InvokeResponse};
