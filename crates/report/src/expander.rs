//! Page expansion: one directive per unit of quantity

use crate::record::Record;
use std::iter::FusedIterator;

/// Render instruction for exactly one output page
///
/// `background` is borrowed from the caller, so every directive of an
/// export points at the same background value.
#[derive(Debug, PartialEq)]
pub struct PageDirective<'b, B: ?Sized> {
    /// Footer label for the page
    pub footer_text: String,
    /// Background shared by the whole export
    pub background: &'b B,
}

impl<B: ?Sized> Clone for PageDirective<'_, B> {
    fn clone(&self) -> Self {
        Self {
            footer_text: self.footer_text.clone(),
            background: self.background,
        }
    }
}

/// Total number of pages a record list expands to
pub fn total_pages(records: &[Record]) -> u64 {
    records.iter().map(|r| u64::from(r.qtde())).sum()
}

/// Lazily expand records into page directives
///
/// Records are visited in order and each one yields `qtde` directives
/// carrying the same footer text.
pub fn pages<'r, 'b, B: ?Sized>(records: &'r [Record], background: &'b B) -> Pages<'r, 'b, B> {
    Pages {
        records: records.iter(),
        background,
        current: None,
        remaining: total_pages(records),
    }
}

/// Expand records into the full ordered list of page directives
pub fn expand<'b, B: ?Sized>(records: &[Record], background: &'b B) -> Vec<PageDirective<'b, B>> {
    pages(records, background).collect()
}

/// Iterator returned by [`pages`]
pub struct Pages<'r, 'b, B: ?Sized> {
    records: std::slice::Iter<'r, Record>,
    background: &'b B,
    /// Footer of the record being repeated and the copies left for it
    current: Option<(String, u32)>,
    remaining: u64,
}

impl<'b, B: ?Sized> Iterator for Pages<'_, 'b, B> {
    type Item = PageDirective<'b, B>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((footer, left)) = &mut self.current {
                if *left > 0 {
                    *left -= 1;
                    self.remaining -= 1;
                    return Some(PageDirective {
                        footer_text: footer.clone(),
                        background: self.background,
                    });
                }
            }

            let record = self.records.next()?;
            self.current = Some((record.footer_text(), record.qtde()));
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match usize::try_from(self.remaining) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }
}

impl<B: ?Sized> FusedIterator for Pages<'_, '_, B> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{CapitalRecord, InteriorRecord};
    use pretty_assertions::assert_eq;

    fn capital(filial: &str, qtde: u32) -> Record {
        Record::Capital(CapitalRecord {
            filial: filial.to_string(),
            qtde,
        })
    }

    #[test]
    fn test_expand_repeats_by_quantity() {
        let records = vec![capital("CENTRO", 3)];
        let pages = expand(&records, "bg");

        assert_eq!(pages.len(), 3);
        for page in &pages {
            assert_eq!(page.footer_text, "FILIAL CENTRO - QTDE. 3");
            assert_eq!(page.background, "bg");
        }
    }

    #[test]
    fn test_expand_preserves_record_order() {
        let records = vec![
            capital("A", 2),
            Record::Interior(InteriorRecord {
                linha: 1,
                ramal: 2,
                cidade: "B".to_string(),
                qtde: 1,
            }),
            capital("C", 1),
        ];
        let footers: Vec<String> = pages(&records, &())
            .map(|page| page.footer_text)
            .collect();

        assert_eq!(
            footers,
            vec![
                "FILIAL A - QTDE. 2",
                "FILIAL A - QTDE. 2",
                "LINHA 1 - RAMAL 2 - CIDADE B - QTDE. 1",
                "FILIAL C - QTDE. 1",
            ]
        );
    }

    #[test]
    fn test_expand_empty() {
        let pages = expand::<str>(&[], "bg");
        assert!(pages.is_empty());
        assert_eq!(total_pages(&[]), 0);
    }

    #[test]
    fn test_all_directives_share_background() {
        let background = vec![1u8, 2, 3];
        let records = vec![capital("A", 2), capital("B", 2)];
        let pages = expand(&records, &background);

        assert!(pages
            .iter()
            .all(|page| std::ptr::eq(page.background, &background)));
    }

    #[test]
    fn test_size_hint_tracks_remaining() {
        let records = vec![capital("A", 2), capital("B", 3)];
        let mut iter = pages(&records, &());
        assert_eq!(iter.size_hint(), (5, Some(5)));
        iter.next();
        iter.next();
        iter.next();
        assert_eq!(iter.size_hint(), (2, Some(2)));
        assert_eq!(iter.count(), 2);
    }

    #[test]
    fn test_total_pages_matches_directive_count() {
        let records = vec![capital("A", 4), capital("B", 7)];
        assert_eq!(total_pages(&records), 11);
        assert_eq!(expand(&records, &()).len(), 11);
    }
}
