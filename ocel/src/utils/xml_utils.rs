/// A wrapper for either an owned or mutable reference to a [`quick_xml::Writer`]
///
/// Allows XML export functions to accept both plain [`std::io::Write`] targets and
/// pre-configured writers (e.g., with indentation).
#[allow(missing_debug_implementations)]
pub enum XMLWriterWrapper<'a, W> {
    /// Owned [`quick_xml::Writer`]
    Owned(quick_xml::Writer<W>),
    /// Mutable Reference to [`quick_xml::Writer`]
    Ref(&'a mut quick_xml::Writer<W>),
}

impl<W> XMLWriterWrapper<'_, W> {
    /// Return a mutable reference to a [`quick_xml::Writer`]
    pub fn to_xml_writer(&mut self) -> &mut quick_xml::Writer<W> {
        match self {
            XMLWriterWrapper::Owned(w) => w,
            XMLWriterWrapper::Ref(w) => w,
        }
    }
}

impl<W: std::io::Write> From<W> for XMLWriterWrapper<'_, W> {
    fn from(w: W) -> Self {
        Self::Owned(quick_xml::Writer::new(w))
    }
}

impl<'a, W> From<&'a mut quick_xml::Writer<W>> for XMLWriterWrapper<'a, W> {
    fn from(w: &'a mut quick_xml::Writer<W>) -> Self {
        Self::Ref(w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owned_and_borrowed_writers() {
        let mut owned: XMLWriterWrapper<'_, Vec<u8>> = Vec::new().into();
        owned.to_xml_writer().get_mut().extend_from_slice(b"<a/>");

        let mut writer = quick_xml::Writer::new(Vec::new());
        {
            let mut borrowed: XMLWriterWrapper<'_, Vec<u8>> = (&mut writer).into();
            borrowed.to_xml_writer().get_mut().extend_from_slice(b"<b/>");
        }
        assert_eq!(writer.into_inner(), b"<b/>".to_vec());
    }
}
