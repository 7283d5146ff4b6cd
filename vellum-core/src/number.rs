//! A closed set of numeric kinds and lossless coercions between them.
use bigdecimal::BigDecimal;
use num_bigint::{BigInt, Sign, ToBigInt};
use num_traits::ToPrimitive;
use std::fmt;
use std::str::FromStr;

/// A template number.
///
/// Arithmetic on mixed kinds happens on the widest kind involved;
/// [`Number::optimize_representation`] narrows a result back down when that
/// loses nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum Number {
    Int(i32),
    Long(i64),
    Double(f64),
    Big(BigInt),
    Decimal(BigDecimal),
}

/// Numeric coercion failure.
#[derive(Debug, Clone, PartialEq)]
pub enum NumberError {
    /// The signum of an IEEE NaN is asked for.
    NanSignum,
    /// A conversion that would lose the value's magnitude or fraction.
    LossyConversion { value: String, target: &'static str },
    /// A string that is not a recognized number.
    Parse { text: String },
}

impl std::error::Error for NumberError {}

impl fmt::Display for NumberError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumberError::NanSignum => f.write_str("The signum of NaN is not defined."),
            NumberError::LossyConversion { value, target } => {
                write!(f, "The number {value} can't be converted to {target} without loss.")
            }
            NumberError::Parse { text } => {
                write!(f, "Can't parse {:?} as a number.", text)
            }
        }
    }
}

impl Number {
    /// Whether this is an IEEE NaN. Only a [`Number::Double`] can be.
    pub fn is_nan(&self) -> bool {
        matches!(self, Number::Double(d) if d.is_nan())
    }

    /// Whether this is an IEEE infinity. Only a [`Number::Double`] can be.
    pub fn is_infinite(&self) -> bool {
        matches!(self, Number::Double(d) if d.is_infinite())
    }

    /// -1, 0 or 1 by the sign of the value. Fails for NaN.
    pub fn signum(&self) -> Result<i32, NumberError> {
        match self {
            Number::Int(n) => Ok(n.signum()),
            Number::Long(n) => Ok(n.signum() as i32),
            Number::Double(d) => {
                if *d > 0.0 {
                    Ok(1)
                } else if *d < 0.0 {
                    Ok(-1)
                } else if *d == 0.0 {
                    Ok(0)
                } else {
                    Err(NumberError::NanSignum)
                }
            }
            Number::Big(n) => Ok(sign_to_i32(n.sign())),
            Number::Decimal(d) => Ok(sign_to_i32(d.sign())),
        }
    }

    /// Converts to `i32`, failing rather than overflowing or truncating a
    /// fraction.
    pub fn to_i32_exact(&self) -> Result<i32, NumberError> {
        let lossy = || NumberError::LossyConversion {
            value: self.to_string(),
            target: "int",
        };
        match self {
            Number::Int(n) => Ok(*n),
            Number::Long(n) => i32::try_from(*n).map_err(|_| lossy()),
            Number::Double(d) => {
                if d % 1.0 != 0.0 || *d < i32::MIN as f64 || *d > i32::MAX as f64 {
                    Err(lossy())
                } else {
                    Ok(*d as i32)
                }
            }
            Number::Big(n) => n.to_i32().ok_or_else(lossy),
            Number::Decimal(d) => {
                if !d.is_integer() {
                    return Err(lossy());
                }
                d.to_bigint().and_then(|n| n.to_i32()).ok_or_else(lossy)
            }
        }
    }

    /// Narrows the value to the cheapest kind that holds it exactly.
    ///
    /// An integer-valued decimal becomes a big integer, then a big integer
    /// in range becomes an [`Number::Int`] or [`Number::Long`]. A decimal
    /// with a fraction becomes a double when that conversion is finite.
    pub fn optimize_representation(self) -> Number {
        let big = match self {
            Number::Decimal(d) => {
                let (unscaled, scale) = d.as_bigint_and_exponent();
                if scale == 0 {
                    unscaled
                } else {
                    return match d.to_f64() {
                        Some(f) if f.is_finite() => Number::Double(f),
                        _ => Number::Decimal(d),
                    };
                }
            }
            Number::Big(n) => n,
            other => return other,
        };
        if let Some(n) = big.to_i32() {
            Number::Int(n)
        } else if let Some(n) = big.to_i64() {
            Number::Long(n)
        } else {
            Number::Big(big)
        }
    }

    /// Parses a decimal number, or one of the IEEE specials `INF`,
    /// `-INF`, `Infinity`, `-Infinity` and `NaN` as a double.
    pub fn parse_decimal_or_double(s: &str) -> Result<Number, NumberError> {
        if s.len() > 2 {
            let bytes = s.as_bytes();
            match bytes[0] {
                b'I' if s == "INF" || s == "Infinity" => {
                    return Ok(Number::Double(f64::INFINITY));
                }
                b'N' if s == "NaN" => return Ok(Number::Double(f64::NAN)),
                b'-' if bytes[1] == b'I' && (s == "-INF" || s == "-Infinity") => {
                    return Ok(Number::Double(f64::NEG_INFINITY));
                }
                _ => {}
            }
        }
        BigDecimal::from_str(s)
            .map(Number::Decimal)
            .map_err(|_| NumberError::Parse { text: s.to_string() })
    }

    /// Converts to an arbitrary precision decimal. Fails for NaN and
    /// infinity, which have no decimal form.
    pub fn to_decimal(&self) -> Result<BigDecimal, NumberError> {
        match self {
            Number::Int(n) => Ok(BigDecimal::from(*n)),
            Number::Long(n) => Ok(BigDecimal::from(*n)),
            Number::Double(d) => BigDecimal::try_from(*d).map_err(|_| {
                NumberError::LossyConversion {
                    value: self.to_string(),
                    target: "decimal",
                }
            }),
            Number::Big(n) => Ok(BigDecimal::from(n.clone())),
            Number::Decimal(d) => Ok(d.clone()),
        }
    }

    /// The name of the kind for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Number::Int(_) => "int",
            Number::Long(_) => "long",
            Number::Double(_) => "double",
            Number::Big(_) => "bigint",
            Number::Decimal(_) => "decimal",
        }
    }
}

fn sign_to_i32(sign: Sign) -> i32 {
    match sign {
        Sign::Minus => -1,
        Sign::NoSign => 0,
        Sign::Plus => 1,
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(n) => n.fmt(f),
            Number::Long(n) => n.fmt(f),
            Number::Double(d) => d.fmt(f),
            Number::Big(n) => n.fmt(f),
            Number::Decimal(d) => d.fmt(f),
        }
    }
}

impl From<i32> for Number {
    fn from(n: i32) -> Self {
        Number::Int(n)
    }
}

impl From<i64> for Number {
    fn from(n: i64) -> Self {
        Number::Long(n)
    }
}

impl From<f64> for Number {
    fn from(n: f64) -> Self {
        Number::Double(n)
    }
}

impl From<BigInt> for Number {
    fn from(n: BigInt) -> Self {
        Number::Big(n)
    }
}

impl From<BigDecimal> for Number {
    fn from(n: BigDecimal) -> Self {
        Number::Decimal(n)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn dec(s: &str) -> Number {
        Number::Decimal(BigDecimal::from_str(s).unwrap())
    }

    fn big(s: &str) -> Number {
        Number::Big(BigInt::from_str(s).unwrap())
    }

    #[test]
    fn signum() {
        assert_eq!(Number::Int(-5).signum().unwrap(), -1);
        assert_eq!(Number::Long(0).signum().unwrap(), 0);
        assert_eq!(Number::Double(0.5).signum().unwrap(), 1);
        assert_eq!(Number::Double(-0.0).signum().unwrap(), 0);
        assert_eq!(dec("-3.14").signum().unwrap(), -1);
        assert_eq!(big("0").signum().unwrap(), 0);
        assert_eq!(
            Number::Double(f64::NAN).signum(),
            Err(NumberError::NanSignum),
        );
    }

    #[test]
    fn to_i32_exact() {
        assert_eq!(Number::Int(7).to_i32_exact().unwrap(), 7);
        assert_eq!(Number::Long(7).to_i32_exact().unwrap(), 7);
        assert_eq!(Number::Double(7.0).to_i32_exact().unwrap(), 7);
        assert_eq!(dec("7").to_i32_exact().unwrap(), 7);
        assert_eq!(big("7").to_i32_exact().unwrap(), 7);

        assert!(Number::Long(i64::from(i32::MAX) + 1).to_i32_exact().is_err());
        assert!(Number::Double(7.5).to_i32_exact().is_err());
        assert!(Number::Double(1e100).to_i32_exact().is_err());
        assert!(Number::Double(f64::NAN).to_i32_exact().is_err());
        assert!(dec("7.5").to_i32_exact().is_err());
        assert!(big("9999999999").to_i32_exact().is_err());
    }

    #[test]
    fn optimize_representation() {
        assert_eq!(dec("5").optimize_representation(), Number::Int(5));
        assert_eq!(
            dec("5000000000").optimize_representation(),
            Number::Long(5_000_000_000),
        );
        assert_eq!(
            dec("0.5").optimize_representation(),
            Number::Double(0.5),
        );
        assert_eq!(big("5").optimize_representation(), Number::Int(5));
        assert_eq!(
            big("99999999999999999999").optimize_representation(),
            big("99999999999999999999"),
        );
        assert_eq!(Number::Int(5).optimize_representation(), Number::Int(5));
        assert_eq!(
            Number::Double(0.5).optimize_representation(),
            Number::Double(0.5),
        );
    }

    #[test]
    fn parse_decimal_or_double() {
        assert_eq!(Number::parse_decimal_or_double("1.25").unwrap(), dec("1.25"));
        assert_eq!(
            Number::parse_decimal_or_double("INF").unwrap(),
            Number::Double(f64::INFINITY),
        );
        assert_eq!(
            Number::parse_decimal_or_double("-Infinity").unwrap(),
            Number::Double(f64::NEG_INFINITY),
        );
        assert!(Number::parse_decimal_or_double("NaN").unwrap().is_nan());
        assert!(Number::parse_decimal_or_double("bogus").is_err());
        // too short for a special, and not a number either
        assert!(Number::parse_decimal_or_double("I").is_err());
    }

    #[test]
    fn to_decimal() {
        assert_eq!(Number::Int(3).to_decimal().unwrap(), BigDecimal::from(3));
        assert_eq!(
            Number::Double(0.5).to_decimal().unwrap(),
            BigDecimal::from_str("0.5").unwrap(),
        );
        assert!(Number::Double(f64::NAN).to_decimal().is_err());
        assert!(Number::Double(f64::INFINITY).to_decimal().is_err());
    }
}
