pub(crate) mod login_request;
