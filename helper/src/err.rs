/// Log the error side of a `Result` without consuming it, right before it is
/// handed back to actix.
#[macro_export]
macro_rules! log_err {
    ($res:expr) => {
        if let Err(err) = &$res {
            tracing::warn!("{}", err);
            tracing::debug!("{:?}", err);
        }
    };
}
