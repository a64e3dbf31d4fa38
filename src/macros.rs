//! Formatted emit variants and call-site registration.

/// Register a call site for the enclosing module, using the module path as
/// the component and the source file as the unit.
#[macro_export]
macro_rules! callsite {
    () => {
        $crate::CallSiteKey::new(module_path!(), file!())
    };
}

/// Log a formatted fatal message.
#[macro_export]
macro_rules! fatalf {
    ($logger:expr, $key:expr, $($arg:tt)*) => {
        $logger.fatal($key, &format!($($arg)*))
    };
}

/// Log a formatted error message.
#[macro_export]
macro_rules! errorf {
    ($logger:expr, $key:expr, $($arg:tt)*) => {
        $logger.error($key, &format!($($arg)*))
    };
}

/// Log a formatted warning message.
#[macro_export]
macro_rules! warnf {
    ($logger:expr, $key:expr, $($arg:tt)*) => {
        $logger.warn($key, &format!($($arg)*))
    };
}

/// Log a formatted informational message.
#[macro_export]
macro_rules! infof {
    ($logger:expr, $key:expr, $($arg:tt)*) => {
        $logger.info($key, &format!($($arg)*))
    };
}

/// Log a formatted debug message.
#[macro_export]
macro_rules! debugf {
    ($logger:expr, $key:expr, $($arg:tt)*) => {
        $logger.debug($key, &format!($($arg)*))
    };
}

/// Log a formatted debug message gated by an expert mask.
#[macro_export]
macro_rules! debugxf {
    ($logger:expr, $key:expr, $mask:expr, $($arg:tt)*) => {
        $logger.debug_with_mask($key, $mask, &format!($($arg)*))
    };
}
