/// Немедленно возвращает ошибку (аналогично `anyhow::bail!`).
///
/// Макрос возвращает `Err(OdsError)` из текущей функции; аргумент — любое
/// значение, конвертируемое в [`OdsError`](crate::OdsError).
///
/// Пример:
///
/// ```ignore
/// use ods_error::{bail, OdsError, OdsResult};
///
/// fn check_depth(depth: usize) -> OdsResult<()> {
///     if depth > 512 {
///         bail!(OdsError::MaxDepth { depth, limit: 512 });
///     }
///     Ok(())
/// }
/// ```
#[macro_export]
macro_rules! bail {
    ($err:expr) => {
        return Err($crate::OdsError::from($err))
    };
}

/// Проверяет условие и вызывает `bail!`, если условие ложно.
///
/// Выражение ошибки вычисляется только при ложном условии.
///
/// ```ignore
/// use ods_error::{ensure, OdsError, OdsResult};
///
/// fn check_name(name: &str) -> OdsResult<()> {
///     ensure!(
///         name.len() <= u16::MAX as usize,
///         OdsError::NameTooLong { len: name.len(), limit: u16::MAX as usize }
///     );
///     Ok(())
/// }
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !($cond) {
            $crate::bail!($err);
        }
    };
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use crate::{OdsError, OdsResult};

    #[test]
    fn test_bail_simple() {
        fn example() -> OdsResult<()> {
            bail!(OdsError::UnsupportedCompression("gzip".into()));
        }

        assert!(matches!(
            example(),
            Err(OdsError::UnsupportedCompression(ref alg)) if alg == "gzip"
        ));
    }

    #[test]
    fn test_bail_converts_io_error() {
        fn example() -> OdsResult<()> {
            bail!(std::io::Error::other("disk gone"));
        }

        assert!(matches!(example(), Err(OdsError::Io(_))));
    }

    #[test]
    fn test_ensure() {
        fn validate(depth: usize) -> OdsResult<()> {
            ensure!(depth <= 4, OdsError::MaxDepth { depth, limit: 4 });
            Ok(())
        }

        assert!(validate(4).is_ok());
        assert!(matches!(
            validate(5),
            Err(OdsError::MaxDepth { depth: 5, limit: 4 })
        ));
    }
}
