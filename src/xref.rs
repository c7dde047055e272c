use std::collections::BTreeMap;
use std::io::{Result, Write};

#[derive(Debug, Default)]
pub struct Xref {
    pub entries: BTreeMap<u32, XrefEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XrefEntry {
    Free,
    Normal { offset: u32, generation: u16 },
}

impl Xref {
    pub fn new() -> Xref {
        Xref {
            entries: BTreeMap::new(),
        }
    }

    pub fn get(&self, id: u32) -> Option<&XrefEntry> {
        self.entries.get(&id)
    }

    pub fn insert(&mut self, id: u32, entry: XrefEntry) {
        self.entries.insert(id, entry);
    }

    /// One past the highest object number, i.e. the trailer's `/Size`.
    pub fn size(&self) -> u32 {
        self.entries.keys().next_back().map_or(1, |&id| id + 1)
    }

    /// Write a classic cross-reference section covering objects `0..size`.
    ///
    /// Object numbers that were reserved but never written are emitted as free entries.
    pub fn write_to(&self, file: &mut dyn Write) -> Result<()> {
        let size = self.size();
        writeln!(file, "xref\n0 {}", size)?;

        let mut write_xref_entry =
            |offset: u32, generation: u16, kind: char| writeln!(file, "{:>010} {:>05} {} ", offset, generation, kind);
        write_xref_entry(0, 65535, 'f')?;

        for id in 1..size {
            match self.get(id) {
                Some(XrefEntry::Normal { offset, generation }) => write_xref_entry(*offset, *generation, 'n')?,
                Some(XrefEntry::Free) | None => write_xref_entry(0, 65535, 'f')?,
            }
        }
        Ok(())
    }
}

#[test]
fn missing_entries_are_written_free() {
    let mut xref = Xref::new();
    xref.insert(1, XrefEntry::Normal { offset: 15, generation: 0 });
    xref.insert(3, XrefEntry::Normal { offset: 120, generation: 0 });
    assert_eq!(xref.size(), 4);

    let mut out = Vec::new();
    xref.write_to(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert_eq!(
        text,
        "xref\n0 4\n0000000000 65535 f \n0000000015 00000 n \n0000000000 65535 f \n0000000120 00000 n \n"
    );
}
