//! SQL Server type rendering.
//!
//! Turns the raw `(name, max_length, precision, scale)` tuple from the
//! catalog into the type string a developer would write in DDL.

use crate::models::TypeDescriptor;

/// Renders a catalog type tuple as a DDL-style type string.
///
/// # Example
/// ```rust
/// use dbscribe_core::models::TypeDescriptor;
/// use dbscribe_core::type_render::render_type;
///
/// let money = TypeDescriptor {
///     name: "decimal".to_string(),
///     max_length: 9,
///     precision: 10,
///     scale: 2,
/// };
/// assert_eq!(render_type(&money), "decimal(10,2)");
/// ```
pub fn render_type(descriptor: &TypeDescriptor) -> String {
    let name = descriptor.name.as_str();

    match name.to_lowercase().as_str() {
        "varchar" | "char" | "varbinary" | "binary" => {
            format!("{name}({})", length_suffix(descriptor.max_length, 1))
        }
        // Unicode types report their length in bytes, two per character
        "nvarchar" | "nchar" => {
            format!("{name}({})", length_suffix(descriptor.max_length, 2))
        }
        "decimal" | "numeric" => {
            format!("{name}({},{})", descriptor.precision, descriptor.scale)
        }
        "datetime2" | "time" | "datetimeoffset" => format!("{name}({})", descriptor.scale),
        "float" if descriptor.precision != 53 => format!("{name}({})", descriptor.precision),
        _ => name.to_string(),
    }
}

fn length_suffix(max_length: i32, bytes_per_char: i32) -> String {
    if max_length == -1 {
        "max".to_string()
    } else {
        (max_length / bytes_per_char).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(name: &str, max_length: i32, precision: i32, scale: i32) -> TypeDescriptor {
        TypeDescriptor {
            name: name.to_string(),
            max_length,
            precision,
            scale,
        }
    }

    #[test]
    fn test_character_types() {
        assert_eq!(render_type(&descriptor("varchar", 50, 0, 0)), "varchar(50)");
        assert_eq!(render_type(&descriptor("char", 10, 0, 0)), "char(10)");
        assert_eq!(render_type(&descriptor("varchar", -1, 0, 0)), "varchar(max)");
    }

    #[test]
    fn test_unicode_types_halve_byte_length() {
        assert_eq!(
            render_type(&descriptor("nvarchar", 100, 0, 0)),
            "nvarchar(50)"
        );
        assert_eq!(render_type(&descriptor("nchar", 20, 0, 0)), "nchar(10)");
        assert_eq!(
            render_type(&descriptor("nvarchar", -1, 0, 0)),
            "nvarchar(max)"
        );
    }

    #[test]
    fn test_binary_types() {
        assert_eq!(render_type(&descriptor("binary", 16, 0, 0)), "binary(16)");
        assert_eq!(
            render_type(&descriptor("varbinary", -1, 0, 0)),
            "varbinary(max)"
        );
    }

    #[test]
    fn test_exact_numeric_types() {
        assert_eq!(
            render_type(&descriptor("decimal", 9, 10, 2)),
            "decimal(10,2)"
        );
        assert_eq!(
            render_type(&descriptor("numeric", 5, 9, 0)),
            "numeric(9,0)"
        );
    }

    #[test]
    fn test_fractional_second_types() {
        assert_eq!(
            render_type(&descriptor("datetime2", 8, 27, 7)),
            "datetime2(7)"
        );
        assert_eq!(render_type(&descriptor("time", 5, 16, 3)), "time(3)");
        assert_eq!(
            render_type(&descriptor("datetimeoffset", 10, 34, 7)),
            "datetimeoffset(7)"
        );
    }

    #[test]
    fn test_float_precision() {
        assert_eq!(render_type(&descriptor("float", 8, 53, 0)), "float");
        assert_eq!(render_type(&descriptor("float", 4, 24, 0)), "float(24)");
    }

    #[test]
    fn test_plain_types_pass_through() {
        assert_eq!(render_type(&descriptor("int", 4, 10, 0)), "int");
        assert_eq!(render_type(&descriptor("bit", 1, 1, 0)), "bit");
        assert_eq!(
            render_type(&descriptor("uniqueidentifier", 16, 0, 0)),
            "uniqueidentifier"
        );
        assert_eq!(render_type(&descriptor("datetime", 8, 23, 3)), "datetime");
    }

    #[test]
    fn test_case_insensitive_match_keeps_spelling() {
        assert_eq!(
            render_type(&descriptor("NVARCHAR", 40, 0, 0)),
            "NVARCHAR(20)"
        );
    }

    #[test]
    fn test_display_uses_renderer() {
        let d = descriptor("nvarchar", 100, 0, 0);
        assert_eq!(d.to_string(), "nvarchar(50)");
    }
}
