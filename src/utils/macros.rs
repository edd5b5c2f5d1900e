/// Joins the API base with a formatted endpoint path.
macro_rules! api {
    ($api:expr, $($tt:tt)*) => {
        format!("{}/{}", $api, format!($($tt)*))
    };
}

pub(crate) use api;
