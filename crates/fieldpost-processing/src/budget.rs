//! Attachment embedding budget.
//!
//! The notifier can only inline a bounded set of images: at most
//! `max_count` files and `max_total_bytes` cumulative bytes. Candidates are
//! sorted ascending by size first, which maximizes how many fit. Non-image
//! files are never embedded regardless of size; everything not embedded is
//! still persisted and linked.

use std::path::PathBuf;

use fieldpost_core::FileRole;

/// One attachment being considered for processing.
#[derive(Debug, Clone)]
pub struct AttachmentCandidate {
    pub filename: String,
    pub path: PathBuf,
    pub size_bytes: u64,
    pub role: FileRole,
}

/// Inline-delivery budget for one notification.
#[derive(Debug, Clone, Copy)]
pub struct EmbedBudget {
    pub max_count: usize,
    pub max_total_bytes: u64,
}

impl Default for EmbedBudget {
    /// 5 files / 8 MiB: below the ~10 MiB ceiling of common email
    /// transports once base64 expansion (~33%) is accounted for.
    fn default() -> Self {
        EmbedBudget {
            max_count: 5,
            max_total_bytes: 8 * 1024 * 1024,
        }
    }
}

/// Result of a budgeting pass over the sorted candidates.
#[derive(Debug, Clone)]
pub struct BudgetOutcome {
    /// Embed flag per candidate, aligned with the sorted order.
    pub embedded: Vec<bool>,
    pub embedded_count: usize,
    pub embedded_bytes: u64,
}

impl EmbedBudget {
    /// Sort candidates ascending by size (stable) and mark which images
    /// fit within the budget. The input vector is reordered in place.
    pub fn select(&self, candidates: &mut [AttachmentCandidate]) -> BudgetOutcome {
        candidates.sort_by_key(|c| c.size_bytes);

        let mut embedded = Vec::with_capacity(candidates.len());
        let mut count = 0usize;
        let mut bytes = 0u64;

        for candidate in candidates.iter() {
            let fits = candidate.role == FileRole::Image
                && count < self.max_count
                && bytes + candidate.size_bytes <= self.max_total_bytes;
            if fits {
                count += 1;
                bytes += candidate.size_bytes;
            }
            embedded.push(fits);
        }

        BudgetOutcome {
            embedded,
            embedded_count: count,
            embedded_bytes: bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(name: &str, size: u64) -> AttachmentCandidate {
        AttachmentCandidate {
            filename: name.to_string(),
            path: PathBuf::from(name),
            size_bytes: size,
            role: FileRole::Image,
        }
    }

    fn other(name: &str, size: u64) -> AttachmentCandidate {
        AttachmentCandidate {
            filename: name.to_string(),
            path: PathBuf::from(name),
            size_bytes: size,
            role: FileRole::Other,
        }
    }

    #[test]
    fn never_exceeds_count_budget() {
        let mut candidates: Vec<_> = (0..10).map(|i| image(&format!("{i}.png"), 10)).collect();
        let outcome = EmbedBudget::default().select(&mut candidates);
        assert_eq!(outcome.embedded_count, 5);
        assert_eq!(outcome.embedded.iter().filter(|e| **e).count(), 5);
    }

    #[test]
    fn never_exceeds_byte_budget() {
        let budget = EmbedBudget {
            max_count: 10,
            max_total_bytes: 100,
        };
        let mut candidates = vec![
            image("a.png", 60),
            image("b.png", 50),
            image("c.png", 30),
        ];
        let outcome = budget.select(&mut candidates);
        // Ascending: 30 + 50 = 80 fit; 60 would exceed 100.
        assert_eq!(outcome.embedded_count, 2);
        assert!(outcome.embedded_bytes <= budget.max_total_bytes);
        assert_eq!(candidates[0].filename, "c.png");
        assert!(outcome.embedded[0] && outcome.embedded[1] && !outcome.embedded[2]);
    }

    #[test]
    fn smallest_first_maximizes_embedded_count() {
        let budget = EmbedBudget {
            max_count: 10,
            max_total_bytes: 10,
        };
        let mut candidates = vec![image("big.png", 9), image("s1.png", 1), image("s2.png", 1)];
        let outcome = budget.select(&mut candidates);
        // Largest-first would embed only big.png; smallest-first embeds both small ones.
        assert_eq!(outcome.embedded_count, 2);
    }

    #[test]
    fn non_images_are_never_embedded() {
        let mut candidates = vec![other("tiny.bin", 1), image("shot.png", 1)];
        let outcome = EmbedBudget::default().select(&mut candidates);
        for (candidate, embedded) in candidates.iter().zip(&outcome.embedded) {
            if candidate.role != FileRole::Image {
                assert!(!embedded);
            }
        }
        assert_eq!(outcome.embedded_count, 1);
    }

    #[test]
    fn oversized_image_is_linked_not_embedded() {
        let budget = EmbedBudget::default();
        let mut candidates = vec![image("huge.png", 50 * 1024 * 1024)];
        let outcome = budget.select(&mut candidates);
        assert_eq!(outcome.embedded_count, 0);
        assert_eq!(outcome.embedded, vec![false]);
    }

    #[test]
    fn empty_input() {
        let outcome = EmbedBudget::default().select(&mut []);
        assert_eq!(outcome.embedded_count, 0);
        assert!(outcome.embedded.is_empty());
    }
}
