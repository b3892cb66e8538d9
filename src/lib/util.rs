// Various common functions

use std::fmt;

/// Coarse one-line rendering of a spoke for trace logging: one character per 8 samples.
pub struct PrintableSpoke<'a>(&'a [u8]);

impl<'a> PrintableSpoke<'a> {
    pub fn new<T>(data: &'a T) -> PrintableSpoke<'a>
    where
        T: ?Sized + AsRef<[u8]> + 'a,
    {
        PrintableSpoke(data.as_ref())
    }
}

fn density(sum: u32) -> char {
    match sum {
        0..8 => ' ',
        8..512 => '.',
        _ => '*',
    }
}

impl fmt::Display for PrintableSpoke<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for chunk in self.0.chunks(8) {
            // a short tail only counts when it holds more than half a chunk
            if chunk.len() > 4 {
                let sum: u32 = chunk.iter().map(|b| *b as u32).sum();
                write!(f, "{}", density(sum))?;
            }
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn printable_spoke() {
        let mut data = vec![0u8; 8];
        data.extend([1u8; 8]);
        data.extend([255u8; 8]);
        data.extend([255u8; 3]);
        assert_eq!(PrintableSpoke::new(&data).to_string(), "[ .*]");

        data.extend([255u8; 2]);
        assert_eq!(PrintableSpoke::new(&data).to_string(), "[ .**]");
    }
}
