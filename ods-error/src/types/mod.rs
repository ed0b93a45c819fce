pub mod ods_error;

// Публичный экспорт всех типов ошибок из вложенных модулей,
// чтобы упростить доступ к ним из внешнего кода.
pub use ods_error::*;
