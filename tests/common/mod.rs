#![allow(dead_code)]

use rand_core::{Infallible, TryCryptoRng, TryRng};

/// Feeds predetermined byte strings to scalar sampling, so blinds and proof
/// nonces can be pinned to known-answer fixtures.
pub struct TestRng<'a> {
    slices: Vec<&'a [u8]>,
    next: usize,
}

impl<'a> TestRng<'a> {
    pub fn new(slices: &[&'a [u8]]) -> Self {
        TestRng {
            slices: slices.to_vec(),
            next: 0,
        }
    }
}

impl TryRng for TestRng<'_> {
    type Error = Infallible;

    fn try_next_u32(&mut self) -> Result<u32, Self::Error> {
        panic!("not needed")
    }

    fn try_next_u64(&mut self) -> Result<u64, Self::Error> {
        panic!("not needed")
    }

    fn try_fill_bytes(&mut self, dst: &mut [u8]) -> Result<(), Self::Error> {
        let slice = self.slices[self.next];
        let (begin, end) = dst.split_at_mut(slice.len());
        begin.copy_from_slice(slice);
        end.fill(0);
        self.next += 1;
        Ok(())
    }
}

impl TryCryptoRng for TestRng<'_> {}

/// Deterministic filler for tests that just need distinct valid keys.
pub struct SeqRng(pub u8);

impl TryRng for SeqRng {
    type Error = Infallible;

    fn try_next_u32(&mut self) -> Result<u32, Self::Error> {
        panic!("not needed")
    }

    fn try_next_u64(&mut self) -> Result<u64, Self::Error> {
        panic!("not needed")
    }

    fn try_fill_bytes(&mut self, dst: &mut [u8]) -> Result<(), Self::Error> {
        self.0 = self.0.wrapping_add(1);
        dst.fill(self.0);
        Ok(())
    }
}

impl TryCryptoRng for SeqRng {}
