use super::backend::Fragment;

/// Transient accumulator for raw encoded audio fragments.
///
/// Owned exclusively by the active recording session: cleared on every arm
/// and on every reset, never shared across takes. Fragments are kept in
/// delivery order; the payload is their concatenation.
#[derive(Debug, Default)]
pub struct FragmentBuffer {
    fragments: Vec<Fragment>,
}

impl FragmentBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fragment in delivery order. Zero-length fragments carry no
    /// audio and are dropped.
    pub fn push(&mut self, fragment: Fragment) {
        if fragment.is_empty() {
            return;
        }
        self.fragments.push(fragment);
    }

    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }

    pub fn byte_len(&self) -> usize {
        self.fragments.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn clear(&mut self) {
        self.fragments.clear();
    }

    /// Concatenate all fragments into a single raw payload, leaving the
    /// buffer empty.
    pub fn take_payload(&mut self) -> Vec<u8> {
        let mut payload = Vec::with_capacity(self.byte_len());
        for fragment in self.fragments.drain(..) {
            payload.extend_from_slice(&fragment);
        }
        payload
    }
}
