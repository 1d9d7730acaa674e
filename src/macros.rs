//===========================================================================//

macro_rules! malformed {
    ($e:expr) => {
        return Err($crate::error::Error::Malformed(::std::string::String::from($e)))
    };
    ($fmt:expr, $($arg:tt)+) => {
        return Err($crate::error::Error::Malformed(format!($fmt, $($arg)+)))
    };
}

//===========================================================================//
