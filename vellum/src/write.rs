//! The [`TemplWrite`] trait
use crate::Result;
use std::fmt;

/// A sink for rendered template output.
pub trait TemplWrite {
    /// write an already formatted piece of output
    fn write_str(&mut self, value: &str) -> Result<()>;

    /// write an integer without going through [`fmt`]
    fn write_int(&mut self, value: i64) -> Result<()> {
        self.write_str(itoa::Buffer::new().format(value))
    }
}

impl<W> TemplWrite for &mut W
where
    W: TemplWrite + ?Sized,
{
    fn write_str(&mut self, value: &str) -> Result<()> {
        W::write_str(self, value)
    }
}

impl TemplWrite for String {
    fn write_str(&mut self, value: &str) -> Result<()> {
        self.push_str(value);
        Ok(())
    }
}

impl TemplWrite for Vec<u8> {
    fn write_str(&mut self, value: &str) -> Result<()> {
        self.extend_from_slice(value.as_bytes());
        Ok(())
    }
}

impl TemplWrite for bytes::BytesMut {
    fn write_str(&mut self, value: &str) -> Result<()> {
        bytes::BufMut::put(self, value.as_bytes());
        Ok(())
    }
}

/// Use a [`fmt::Write`] as a [`TemplWrite`].
pub struct FmtTemplWrite<W>(pub W);

impl<W> TemplWrite for FmtTemplWrite<W>
where
    W: fmt::Write,
{
    fn write_str(&mut self, value: &str) -> Result<()> {
        self.0.write_str(value)?;
        Ok(())
    }
}

/// Use a [`TemplWrite`] as a [`fmt::Write`].
///
/// The source error is lost through the [`fmt::Error`] bottleneck, so
/// keep the adapter only around calls that can't fail differently.
pub struct TemplWriteFmt<W>(pub W);

impl<W> fmt::Write for TemplWriteFmt<W>
where
    W: TemplWrite,
{
    fn write_str(&mut self, value: &str) -> fmt::Result {
        self.0.write_str(value).map_err(|_| fmt::Error)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sinks() {
        let mut buf = String::new();
        buf.write_str("a").unwrap();
        buf.write_int(-42).unwrap();
        assert_eq!(buf, "a-42");

        let mut buf = Vec::new();
        buf.write_str("ab").unwrap();
        assert_eq!(buf, b"ab");

        let mut buf = bytes::BytesMut::new();
        buf.write_str("ab").unwrap();
        assert_eq!(&buf[..], b"ab");
    }

    #[test]
    fn fmt_adapters() {
        let mut out = String::new();
        FmtTemplWrite(&mut out).write_str("x").unwrap();
        assert_eq!(out, "x");

        use std::fmt::Write;
        let mut out = String::new();
        write!(TemplWriteFmt(&mut out), "{}!", 1).unwrap();
        assert_eq!(out, "1!");
    }
}
