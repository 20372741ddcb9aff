use super::{Page, Paginator};

/// Category assigned to items that carry none
pub const UNCATEGORIZED: &str = "OTHER";

/// Items sharing one category, in their original order
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryGroup<T> {
    pub category: String,
    pub items: Vec<T>,
}

/// At most `chunk_size` items of one category.
///
/// `card_index` / `total_cards` number the cards within their category, so a
/// category spilling over several cards can render "2 of 3".
#[derive(Debug, Clone, PartialEq)]
pub struct Card<T> {
    pub category: String,
    pub items: Vec<T>,
    pub card_index: usize,
    pub total_cards: usize,
}

impl<T> Card<T> {
    pub fn is_continued(&self) -> bool {
        self.total_cards > 1
    }
}

/// Group items by category in first-seen order; blank categories go to [`UNCATEGORIZED`]
pub fn group_by_category<T, F>(items: impl IntoIterator<Item = T>, category_of: F) -> Vec<CategoryGroup<T>>
where
    F: Fn(&T) -> Option<String>,
{
    let mut groups: Vec<CategoryGroup<T>> = Vec::new();
    for item in items {
        let category = category_of(&item)
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| UNCATEGORIZED.to_string());
        match groups.iter_mut().find(|g| g.category == category) {
            Some(group) => group.items.push(item),
            None => groups.push(CategoryGroup { category, items: vec![item] }),
        }
    }
    groups
}

/// Split every group into cards of at most `chunk_size` items. Cards never
/// span two categories; a zero chunk size is treated as one.
pub fn chunk_by_category<T: Clone>(groups: &[CategoryGroup<T>], chunk_size: usize) -> Vec<Card<T>> {
    let chunk_size = chunk_size.max(1);
    groups
        .iter()
        .flat_map(|group| {
            let total_cards = group.items.len().div_ceil(chunk_size);
            group.items.chunks(chunk_size).enumerate().map(move |(card_index, chunk)| Card {
                category: group.category.clone(),
                items: chunk.to_vec(),
                card_index,
                total_cards,
            })
        })
        .collect()
}

/// Paging over cards. Re-chunks whenever the groups or the chunk size change,
/// so card numbering always matches the current chunk size.
#[derive(Debug, Clone)]
pub struct CardPaginator<T> {
    groups: Vec<CategoryGroup<T>>,
    chunk_size: usize,
    pages: Paginator<Card<T>>,
}

impl<T: Clone> CardPaginator<T> {
    pub fn new(groups: Vec<CategoryGroup<T>>, chunk_size: usize, page_size: usize) -> Self {
        let cards = chunk_by_category(&groups, chunk_size);
        Self {
            groups,
            chunk_size: chunk_size.max(1),
            pages: Paginator::new(cards, page_size),
        }
    }

    pub fn groups(&self) -> &[CategoryGroup<T>] {
        &self.groups
    }

    pub fn cards(&self) -> &[Card<T>] {
        self.pages.items()
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn set_groups(&mut self, groups: Vec<CategoryGroup<T>>) {
        self.groups = groups;
        self.rechunk();
    }

    pub fn set_chunk_size(&mut self, chunk_size: usize) {
        self.chunk_size = chunk_size.max(1);
        self.rechunk();
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.pages.set_page_size(page_size);
    }

    fn rechunk(&mut self) {
        self.pages.set_items(chunk_by_category(&self.groups, self.chunk_size));
    }

    pub fn total_pages(&self) -> usize {
        self.pages.total_pages()
    }

    pub fn page_index(&self) -> usize {
        self.pages.page_index()
    }

    pub fn current_page(&self) -> Page<'_, Card<T>> {
        self.pages.current_page()
    }

    pub fn next(&mut self) -> bool {
        self.pages.next()
    }

    pub fn prev(&mut self) -> bool {
        self.pages.prev()
    }

    pub fn jump(&mut self, index: usize) -> bool {
        self.pages.jump(index)
    }
}

impl<T: Clone> Default for CardPaginator<T> {
    fn default() -> Self {
        Self::new(Vec::new(), 1, 1)
    }
}
