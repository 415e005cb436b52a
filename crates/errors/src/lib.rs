#![allow(forbidden_lint_groups)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

mod logging;
mod panic_handler;

pub use backtrace::Backtrace;
pub use color_eyre::{Report, Result, eyre::WrapErr};
pub use log::{LevelFilter, debug, error, info, warn};
pub use logging::{LogErrorExt, LogErrorWithExt, LogOptionWithExt, MakeReportExt, WORKSPACE_CRATES, initialize_logging};
pub use minitrace;
pub use panic_handler::initialize_panic_handler;
use std::{
    error::Error as StdError,
    fmt::{Debug, Display},
    marker::PhantomData,
    ops::Deref,
};
pub use strip_ansi_escapes::strip_str;

pub type TypedResult<R, E> = Result<R, TypedReport<E>>;

/// A `Report` that is known to wrap an `E`, so callers can still match on the error kind.
pub struct TypedReport<E> {
    pub report: Report,
    phantom: PhantomData<E>,
}

impl<E> From<TypedReport<E>> for Report {
    fn from(value: TypedReport<E>) -> Self {
        value.report
    }
}

impl<E: Send + Sync + StdError + 'static> TypedReport<E> {
    pub fn new(error: E) -> Self {
        Self { report: Report::new(error), phantom: PhantomData }
    }

    #[must_use]
    pub fn into_inner(self) -> E {
        // only ever built from an `E` in `new`
        self.report.downcast().unwrap()
    }

    #[must_use]
    pub fn inner(&self) -> &E {
        self.report.downcast_ref().unwrap()
    }

    #[must_use]
    pub fn wrap_err<D>(self, message: D) -> Self
    where
        D: Display + Send + Sync + 'static,
    {
        // context is attached on top of the same root error, downcasting keeps working
        Self { report: self.report.wrap_err(message), phantom: PhantomData }
    }
}

impl<E> From<E> for TypedReport<E>
where
    E: StdError + Send + Sync + 'static,
{
    fn from(value: E) -> Self {
        Self::new(value)
    }
}

impl<E: Send + Sync + StdError + 'static> Deref for TypedReport<E> {
    type Target = E;

    fn deref(&self) -> &Self::Target {
        self.inner()
    }
}

pub trait AsReport<R> {
    fn inner_result(self) -> Result<R>;
}

impl<R, E> AsReport<R> for Result<R, TypedReport<E>>
where
    E: Send + Sync + StdError + 'static,
{
    fn inner_result(self) -> Result<R> {
        self.map_err(|e| e.report)
    }
}

impl<E> Debug for TypedReport<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(&self.report, f)
    }
}

impl<E> Display for TypedReport<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.report, f)
    }
}

pub trait ColorLess {
    fn no_color_debug(&self) -> String;
    fn no_color_display(&self) -> String;
}

impl ColorLess for Report {
    fn no_color_debug(&self) -> String {
        strip_str(format!("{self:?}"))
    }

    fn no_color_display(&self) -> String {
        strip_str(format!("{self}"))
    }
}

#[macro_export]
macro_rules! error_backtrace {
    ($($arg:tt)*) => {{
        let backtrace = $crate::Backtrace::new();
        $crate::error!("{}: {:?}", format_args!($($arg)*), backtrace);
    }};
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Debug, PartialEq, Eq)]
    struct Unplugged(i32);

    impl Display for Unplugged {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "device {} is unplugged", self.0)
        }
    }

    impl StdError for Unplugged {}

    fn failing() -> TypedResult<(), Unplugged> {
        Err(Unplugged(7).into())
    }

    #[test]
    fn typed_report_keeps_the_error_kind() {
        let report = failing().unwrap_err();
        assert_eq!(report.inner(), &Unplugged(7));
        assert_eq!(report.0, 7);
        assert_eq!(report.to_string(), "device 7 is unplugged");
    }

    #[test]
    fn wrapped_typed_report_still_downcasts() {
        let report = failing().unwrap_err().wrap_err("while connecting");
        assert_eq!(report.to_string(), "while connecting");
        assert_eq!(report.into_inner(), Unplugged(7));
    }

    #[test]
    fn typed_result_converts_into_plain_result() {
        let result = failing().inner_result();
        assert!(result.unwrap_err().no_color_display().contains("unplugged"));
    }
}
