//! Display and Debug implementations for Value

use std::fmt;

use super::{numeric, Value, ValueData};

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with_data(|data| fmt_data(data, f))
    }
}

fn fmt_data(data: &ValueData, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match data {
        ValueData::Null => f.write_str("NULL"),
        ValueData::Type(ty) => write!(f, "{ty}"),
        ValueData::Boolean(true) => f.write_str("True"),
        ValueData::Boolean(false) => f.write_str("False"),
        ValueData::Integer { value, .. } => write!(f, "{value}"),
        ValueData::Real { value, .. } => f.write_str(&numeric::format_real(*value)),
        ValueData::String(s) => f.write_str(s),

        ValueData::Array(array) => {
            write!(f, "Array [{}, {}]{{", array.start(), array.finish())?;
            for (i, item) in array.items().iter().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                write!(f, " {item}")?;
            }
            f.write_str(" }")
        }

        ValueData::Dictionary(dict) => {
            f.write_str("Dictionary {")?;
            for (i, (key, value)) in dict.iter().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                write!(f, " {key}: {value}")?;
            }
            f.write_str(" }")
        }

        ValueData::Structure(s) => {
            match s.structure_type().and_then(|ty| ty.name()) {
                Some(name) => write!(f, "{name} {{")?,
                None => f.write_str("Structure {")?,
            }
            for (i, (name, value)) in s.iter().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                write!(f, " {name}: {value}")?;
            }
            f.write_str(" }")
        }

        ValueData::Executable(exe) => {
            let arities: Vec<String> = exe.arities().map(|a| a.to_string()).collect();
            write!(f, "<function {}/{}>", exe.name(), arities.join(","))
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cell = self.read();
        write!(f, "{}(", cell.data.kind())?;
        fmt_data(&cell.data, f)?;
        if cell.locked {
            f.write_str(", locked")?;
        }
        f.write_str(")")
    }
}
