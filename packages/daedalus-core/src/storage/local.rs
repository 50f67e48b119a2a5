/// Local filesystem board store.
///
/// Owns the in-memory [`BoardState`] of one board directory and every
/// mutation of it. Each operation:
/// - suppresses the attached watcher, so our own writes are not reported
///   back as external changes
/// - validates card paths against the board root
/// - writes to disk first and only then updates memory
///
/// Calls are expected to be serialized by the owner; there is no internal
/// locking against concurrent mutation.
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::{file_size, validate_list_name, validate_path, Result, StorageError};
use crate::config::{is_list_locked, save_board_config, BoardConfig, ListEntry};
use crate::frontmatter::{body_preview, read_card_content, write_card_file};
use crate::ordering::{compute_insert_position, insert_sorted, is_crowded, renormalized_keys, sort_cards};
use crate::scanner::{card_file_name, scan_board};
use crate::timestamp;
use crate::types::{BoardState, BoardStats, CardMetadata, KanbanCard};
use crate::watcher::{PollWatcher, DEFAULT_POLL_INTERVAL};

/// Tuning knobs of a [`BoardStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    /// How often the attached watcher polls the board.
    pub poll_interval: Duration,
    /// How long the watcher ignores changes after each of our own writes.
    /// Must cover at least one poll so the write is absorbed silently.
    pub suppress_window: Duration,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            suppress_window: DEFAULT_POLL_INTERVAL + Duration::from_secs(1),
        }
    }
}

pub struct BoardStore {
    state: BoardState,
    options: StoreOptions,
    watcher: Option<PollWatcher>,
}

impl BoardStore {
    /// Scan `path` and open it as a board.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with(path, StoreOptions::default())
    }

    pub fn open_with(path: &Path, options: StoreOptions) -> Result<Self> {
        let state = scan_board(path)?;
        Ok(Self {
            state,
            options,
            watcher: None,
        })
    }

    pub fn state(&self) -> &BoardState {
        &self.state
    }

    pub fn root(&self) -> &Path {
        &self.state.root_path
    }

    pub fn config(&self) -> &BoardConfig {
        &self.state.config
    }

    pub fn options(&self) -> StoreOptions {
        self.options
    }

    /// Cards of one list in display order.
    pub fn cards(&self, list: &str) -> Option<&[KanbanCard]> {
        self.state.lists.get(list).map(Vec::as_slice)
    }

    pub fn card(&self, path: &Path) -> Option<&KanbanCard> {
        let (list, idx) = self.state.find_card(path)?;
        self.state.lists.get(&list).and_then(|cards| cards.get(idx))
    }

    pub fn stats(&self) -> BoardStats {
        self.state.stats()
    }

    /// Rescan the board from disk. The id high-water mark never goes down.
    pub fn reload(&mut self) -> Result<()> {
        let mut state = scan_board(&self.state.root_path)?;
        state.max_id = state.max_id.max(self.state.max_id);
        self.state = state;
        Ok(())
    }

    /// Start polling the board for external changes. Replaces any watcher
    /// attached before.
    pub fn watch<F>(&mut self, on_change: F) -> Result<&PollWatcher>
    where
        F: FnMut() + Send + 'static,
    {
        self.unwatch();
        let watcher =
            PollWatcher::with_interval(&self.state.root_path, self.options.poll_interval, on_change)?;
        let watcher = self.watcher.insert(watcher);
        Ok(&*watcher)
    }

    pub fn watcher(&self) -> Option<&PollWatcher> {
        self.watcher.as_ref()
    }

    pub fn unwatch(&mut self) {
        if let Some(mut watcher) = self.watcher.take() {
            watcher.close();
        }
    }

    fn begin_write(&self) {
        if let Some(watcher) = &self.watcher {
            watcher.suppress(self.options.suppress_window);
        }
    }

    /// Validate a card path and locate it in memory.
    fn locate_card(&self, path: &Path) -> Result<(PathBuf, String, usize)> {
        let path = validate_path(&self.state.root_path, path)?;
        match self.state.find_card(&path) {
            Some((list, idx)) => Ok((path, list, idx)),
            None => {
                log::warn!("[daedalus.storage] Card not found in any list: {:?}", path);
                Err(StorageError::CardNotFound(path))
            }
        }
    }

    fn require_list(&self, list: &str) -> Result<()> {
        if self.state.lists.contains_key(list) {
            Ok(())
        } else {
            log::warn!("[daedalus.storage] List not found: {}", list);
            Err(StorageError::ListNotFound(list.to_string()))
        }
    }

    fn require_unlocked(&self, list: &str) -> Result<()> {
        if is_list_locked(&self.state.config, list) {
            log::warn!("[daedalus.storage] Operation blocked by locked list {}", list);
            return Err(StorageError::ListLocked(list.to_string()));
        }
        Ok(())
    }

    fn list_mut(&mut self, list: &str) -> Result<&mut Vec<KanbanCard>> {
        self.state
            .lists
            .get_mut(list)
            .ok_or_else(|| StorageError::ListNotFound(list.to_string()))
    }

    /// Persist a modified copy of the config, then adopt it.
    fn commit_config(&mut self, config: BoardConfig) -> Result<()> {
        save_board_config(&self.state.root_path, &config)?;
        self.state.config = config;
        Ok(())
    }

    /// Apply `f` to a copy of the board config and save it.
    pub fn update_config<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut BoardConfig),
    {
        self.begin_write();
        let mut config = self.state.config.clone();
        f(&mut config);
        self.commit_config(config)
    }

    // ---------------------------------------------------------------------------
    // Cards
    // ---------------------------------------------------------------------------

    /// Full markdown body of a card.
    pub fn card_content(&self, path: &Path) -> Result<String> {
        let path = validate_path(&self.state.root_path, path)?;
        read_card_content(&path)
    }

    /// First unused id above the high-water mark whose file name is free
    /// in `list`.
    fn next_free_id(&self, list: &str) -> Result<u64> {
        let dir = self.state.root_path.join(list);
        let mut id = self.next_id()?;
        while dir.join(card_file_name(id)).exists() {
            id = id.checked_add(1).ok_or(StorageError::IdsExhausted(id))?;
        }
        Ok(id)
    }

    fn next_id(&self) -> Result<u64> {
        self.state
            .max_id
            .checked_add(1)
            .ok_or(StorageError::IdsExhausted(self.state.max_id))
    }

    /// Order key for a card placed at `position` in `list`, ignoring the card
    /// at `exclude`. Renumbers the list first when the slot is too narrow.
    fn place_in_list(&mut self, list: &str, position: &str, exclude: Option<&Path>) -> Result<f64> {
        let siblings = |state: &BoardState| -> Vec<KanbanCard> {
            state.lists[list]
                .iter()
                .filter(|c| Some(c.file_path.as_path()) != exclude)
                .cloned()
                .collect()
        };

        let cards = siblings(&self.state);
        let (key, idx) = compute_insert_position(&cards, position);
        if !is_crowded(&cards, idx) {
            return Ok(key);
        }

        log::debug!(
            "[daedalus.storage] Order keys exhausted at {}[{}], renumbering",
            list,
            idx
        );
        self.renormalize_list(list)?;
        let cards = siblings(&self.state);
        Ok(compute_insert_position(&cards, position).0)
    }

    /// Create a card in `list` at `position` (`"top"`, `"bottom"` or a slot
    /// index). An empty title becomes the card's id.
    pub fn create_card(
        &mut self,
        list: &str,
        title: &str,
        body: &str,
        position: &str,
    ) -> Result<KanbanCard> {
        let meta = CardMetadata {
            title: title.trim().to_string(),
            ..Default::default()
        };
        self.create_card_with(list, meta, body, position)
    }

    /// Create a card from one of the board's templates.
    pub fn create_card_from_template(
        &mut self,
        list: &str,
        template: &str,
        position: &str,
    ) -> Result<KanbanCard> {
        let Some(template) = self.state.config.templates.iter().find(|t| t.name == template) else {
            log::warn!("[daedalus.storage] Unknown card template {:?}", template);
            return Err(StorageError::TemplateNotFound(template.to_string()));
        };
        let meta = CardMetadata {
            title: template.title.clone(),
            labels: template.labels.clone(),
            icon: template.icon.clone(),
            estimate: template.estimate,
            counter: template.counter.clone(),
            checklist: template.checklist.clone(),
            ..Default::default()
        };
        let body = template.body.clone();
        self.create_card_with(list, meta, &body, position)
    }

    fn create_card_with(
        &mut self,
        list: &str,
        mut meta: CardMetadata,
        body: &str,
        position: &str,
    ) -> Result<KanbanCard> {
        self.require_list(list)?;
        self.begin_write();

        let id = self.next_free_id(list)?;
        let list_order = self.place_in_list(list, position, None)?;

        if meta.title.is_empty() {
            meta.title = id.to_string();
        }
        let now = timestamp::now();
        meta.id = id;
        meta.list_order = list_order;
        meta.created = Some(now);
        meta.updated = Some(now);

        let full_body = format!("# {}\n\n{}", meta.title, body);
        let path = validate_path(
            &self.state.root_path,
            &self.state.root_path.join(list).join(card_file_name(id)),
        )?;
        write_card_file(&path, &meta, &full_body)?;

        let card = KanbanCard {
            file_path: path.clone(),
            list_name: list.to_string(),
            metadata: meta,
            preview_text: body_preview(&full_body),
        };
        self.state.max_id = self.state.max_id.max(id);
        self.state.total_file_bytes += file_size(&path);
        insert_sorted(self.list_mut(list)?, card.clone());

        log::info!(
            "[daedalus.storage] Created card {} in {} ({:?}, order {})",
            id,
            list,
            card.metadata.title,
            list_order
        );
        Ok(card)
    }

    /// Overwrite a card's metadata and body.
    ///
    /// Stamps `updated` (and `created` when missing). A card without an id
    /// gets a fresh one. Foreign frontmatter keys on disk are preserved.
    pub fn save_card(&mut self, path: &Path, mut metadata: CardMetadata, body: &str) -> Result<KanbanCard> {
        let (path, list, idx) = self.locate_card(path)?;
        if metadata.id == 0 {
            metadata.id = self.next_id()?;
            log::debug!(
                "[daedalus.storage] Assigning id {} to id-less card {:?}",
                metadata.id,
                path
            );
        }
        self.begin_write();

        let now = timestamp::now();
        metadata.updated = Some(now);
        metadata.created.get_or_insert(now);

        let old_size = file_size(&path);
        write_card_file(&path, &metadata, body).map_err(|e| {
            log::error!("[daedalus.storage] Failed to save card {:?}: {}", path, e);
            e
        })?;

        self.state.total_file_bytes += file_size(&path) - old_size;
        self.state.max_id = self.state.max_id.max(metadata.id);

        let cards = self.list_mut(&list)?;
        let mut card = cards.remove(idx);
        card.metadata = metadata;
        card.preview_text = body_preview(body);
        insert_sorted(cards, card.clone());

        log::info!(
            "[daedalus.storage] Saved card {} in {} ({:?})",
            card.id(),
            list,
            card.metadata.title
        );
        Ok(card)
    }

    /// Delete a card file. The id high-water mark is not lowered.
    pub fn delete_card(&mut self, path: &Path) -> Result<()> {
        let (path, list, idx) = self.locate_card(path)?;
        self.begin_write();

        let size = file_size(&path);
        fs::remove_file(&path).map_err(|e| {
            log::error!("[daedalus.storage] Failed to remove card {:?}: {}", path, e);
            e
        })?;

        self.state.total_file_bytes -= size;
        let card = self.list_mut(&list)?.remove(idx);
        log::info!(
            "[daedalus.storage] Deleted card {} from {} ({} bytes)",
            card.id(),
            list,
            size
        );
        Ok(())
    }

    /// Move a card to `target` with an explicit order key. Same-list moves
    /// only rewrite the key; cross-list moves also move the file.
    pub fn move_card(&mut self, path: &Path, target: &str, list_order: f64) -> Result<KanbanCard> {
        let (path, source, idx) = self.locate_card(path)?;
        self.require_list(target)?;
        self.require_unlocked(&source)?;
        self.require_unlocked(target)?;
        self.begin_write();
        self.move_card_unchecked(&path, &source, idx, target, list_order)
    }

    /// Move a card to `position` (`"top"`, `"bottom"` or a slot index) in
    /// `target`.
    pub fn move_card_to(&mut self, path: &Path, target: &str, position: &str) -> Result<KanbanCard> {
        let (path, source, _) = self.locate_card(path)?;
        self.require_list(target)?;
        self.require_unlocked(&source)?;
        self.require_unlocked(target)?;
        self.begin_write();

        let list_order = self.place_in_list(target, position, Some(&path))?;
        // renumbering may have shifted the card within its list
        let (_, idx) = self
            .state
            .find_card(&path)
            .ok_or_else(|| StorageError::CardNotFound(path.clone()))?;
        self.move_card_unchecked(&path, &source, idx, target, list_order)
    }

    fn move_card_unchecked(
        &mut self,
        path: &Path,
        source: &str,
        idx: usize,
        target: &str,
        list_order: f64,
    ) -> Result<KanbanCard> {
        let body = read_card_content(path)?;
        let mut card = self.state.lists[source][idx].clone();
        card.metadata.updated = Some(timestamp::now());
        card.metadata.list_order = list_order;

        let cross_list = source != target;
        let old_size = file_size(path);
        if cross_list {
            let file_name = path
                .file_name()
                .ok_or_else(|| StorageError::InvalidPath(path.to_path_buf()))?;
            let new_path = self.state.root_path.join(target).join(file_name);
            if new_path.exists() {
                log::warn!("[daedalus.storage] Move target exists: {:?}", new_path);
                return Err(StorageError::CardExists(new_path));
            }
            fs::rename(path, &new_path).map_err(|e| {
                log::error!(
                    "[daedalus.storage] Failed to move {:?} to {:?}: {}",
                    path,
                    new_path,
                    e
                );
                e
            })?;
            if let Err(e) = write_card_file(&new_path, &card.metadata, &body) {
                log::error!("[daedalus.storage] Failed to write moved card {:?}: {}", new_path, e);
                if let Err(undo) = fs::rename(&new_path, path) {
                    log::error!("[daedalus.storage] Failed to restore {:?}: {}", path, undo);
                }
                return Err(e);
            }
            card.file_path = new_path;
            card.list_name = target.to_string();
        } else {
            write_card_file(path, &card.metadata, &body)?;
        }

        self.state.total_file_bytes += file_size(&card.file_path) - old_size;
        self.list_mut(source)?.remove(idx);
        insert_sorted(self.list_mut(target)?, card.clone());

        if cross_list {
            log::info!(
                "[daedalus.storage] Moved card {} from {} to {}",
                card.id(),
                source,
                target
            );
        } else {
            log::debug!(
                "[daedalus.storage] Reordered card {} in {} to {}",
                card.id(),
                source,
                list_order
            );
        }
        Ok(card)
    }

    /// Move every card of `source` to the end of `target`, keeping their
    /// relative order. Returns the number of cards moved.
    pub fn move_all_cards(&mut self, source: &str, target: &str) -> Result<usize> {
        if source == target {
            return Err(StorageError::SameList(source.to_string()));
        }
        self.require_list(source)?;
        self.require_list(target)?;
        self.require_unlocked(source)?;
        self.require_unlocked(target)?;

        let cards = self.state.lists[source].clone();
        if cards.is_empty() {
            return Ok(0);
        }
        self.begin_write();

        let base = self.state.lists[target].last().map_or(0.0, KanbanCard::list_order);
        for (i, card) in cards.iter().enumerate() {
            let idx = self
                .state
                .find_card(&card.file_path)
                .map(|(_, idx)| idx)
                .ok_or_else(|| StorageError::CardNotFound(card.file_path.clone()))?;
            self.move_card_unchecked(&card.file_path, source, idx, target, base + i as f64 + 1.0)?;
        }

        log::info!(
            "[daedalus.storage] Moved all {} cards from {} to {}",
            cards.len(),
            source,
            target
        );
        Ok(cards.len())
    }

    /// Delete every card of `list`, keeping the list itself.
    pub fn delete_all_cards(&mut self, list: &str) -> Result<usize> {
        self.require_list(list)?;
        self.require_unlocked(list)?;

        let cards = self.state.lists[list].clone();
        if cards.is_empty() {
            return Ok(0);
        }
        self.begin_write();

        let mut freed = 0;
        for card in &cards {
            let size = file_size(&card.file_path);
            fs::remove_file(&card.file_path).map_err(|e| {
                log::error!(
                    "[daedalus.storage] Failed to remove card {:?}: {}",
                    card.file_path,
                    e
                );
                e
            })?;
            freed += size;
            self.state.total_file_bytes -= size;
            self.list_mut(list)?.retain(|c| c.file_path != card.file_path);
        }

        log::info!(
            "[daedalus.storage] Deleted {} cards from {} ({} bytes)",
            cards.len(),
            list,
            freed
        );
        Ok(cards.len())
    }

    /// Rewrite every key of `list` to 1, 2, ..., n, keeping the order.
    pub fn renormalize_list(&mut self, list: &str) -> Result<()> {
        self.require_list(list)?;
        self.begin_write();

        let cards = self.state.lists[list].clone();
        let keys = renormalized_keys(cards.len());
        let result = self.rewrite_keys(list, &cards, &keys);

        // a partial failure can leave keys out of order
        if let Some(cards) = self.state.lists.get_mut(list) {
            sort_cards(cards);
        }
        result?;
        log::info!("[daedalus.storage] Renumbered {} cards in {}", cards.len(), list);
        Ok(())
    }

    fn rewrite_keys(&mut self, list: &str, cards: &[KanbanCard], keys: &[f64]) -> Result<()> {
        for (card, key) in cards.iter().zip(keys) {
            if card.list_order() == *key {
                continue;
            }
            let body = read_card_content(&card.file_path)?;
            let mut metadata = card.metadata.clone();
            metadata.list_order = *key;

            let old_size = file_size(&card.file_path);
            write_card_file(&card.file_path, &metadata, &body)?;
            self.state.total_file_bytes += file_size(&card.file_path) - old_size;

            if let Some(slot) = self
                .list_mut(list)?
                .iter_mut()
                .find(|c| c.file_path == card.file_path)
            {
                slot.metadata = metadata;
            }
        }
        Ok(())
    }

    // ---------------------------------------------------------------------------
    // Labels
    // ---------------------------------------------------------------------------

    /// Apply `edit` to the labels of every card carrying `label`, writing
    /// each affected card. Returns the number of cards changed.
    fn update_cards_with_label<F>(&mut self, label: &str, edit: F) -> Result<usize>
    where
        F: Fn(&mut Vec<String>),
    {
        let affected: Vec<(String, PathBuf)> = self
            .state
            .lists
            .iter()
            .flat_map(|(list, cards)| {
                cards
                    .iter()
                    .filter(|c| c.metadata.labels.iter().any(|l| l == label))
                    .map(move |c| (list.clone(), c.file_path.clone()))
            })
            .collect();

        let now = timestamp::now();
        for (list, path) in &affected {
            let Some(card) = self.state.lists[list].iter().find(|c| &c.file_path == path) else {
                continue;
            };
            let mut metadata = card.metadata.clone();
            edit(&mut metadata.labels);
            metadata.updated = Some(now);

            let body = read_card_content(path)?;
            let old_size = file_size(path);
            write_card_file(path, &metadata, &body)?;
            self.state.total_file_bytes += file_size(path) - old_size;

            if let Some(slot) = self.list_mut(list)?.iter_mut().find(|c| &c.file_path == path) {
                slot.metadata = metadata;
            }
        }
        Ok(affected.len())
    }

    /// Rename a label on every card and carry its color over.
    pub fn rename_label(&mut self, old: &str, new: &str) -> Result<usize> {
        let (old, new) = (old.trim(), new.trim());
        if old.is_empty() || new.is_empty() || old == new {
            log::warn!("[daedalus.storage] Invalid label rename {:?} -> {:?}", old, new);
            return Err(StorageError::InvalidLabel {
                old: old.to_string(),
                new: new.to_string(),
            });
        }
        self.begin_write();

        let affected = self.update_cards_with_label(old, |labels| {
            let had_new = labels.iter().any(|l| l == new);
            if had_new {
                labels.retain(|l| l != old);
            } else {
                for l in labels.iter_mut().filter(|l| l.as_str() == old) {
                    *l = new.to_string();
                }
            }
        })?;

        if let Some(color) = self.state.config.label_colors.get(old).cloned() {
            let mut config = self.state.config.clone();
            config.label_colors.remove(old);
            config.label_colors.insert(new.to_string(), color);
            self.commit_config(config)?;
        }

        log::info!(
            "[daedalus.storage] Renamed label {:?} -> {:?} on {} cards",
            old,
            new,
            affected
        );
        Ok(affected)
    }

    /// Strip a label from every card and drop its color.
    pub fn remove_label(&mut self, label: &str) -> Result<usize> {
        self.begin_write();
        let affected = self.update_cards_with_label(label, |labels| labels.retain(|l| l != label))?;

        if self.state.config.label_colors.contains_key(label) {
            let mut config = self.state.config.clone();
            config.label_colors.remove(label);
            self.commit_config(config)?;
        }

        log::info!(
            "[daedalus.storage] Removed label {:?} from {} cards",
            label,
            affected
        );
        Ok(affected)
    }

    // ---------------------------------------------------------------------------
    // Lists
    // ---------------------------------------------------------------------------

    /// Create an empty list directory and declare it at the end of the board.
    pub fn create_list(&mut self, name: &str) -> Result<String> {
        let name = validate_list_name(name)?;
        let dir = self.state.root_path.join(&name);
        if self.state.lists.contains_key(&name) || dir.exists() {
            return Err(StorageError::ListExists(name));
        }
        self.begin_write();

        fs::create_dir_all(&dir).map_err(|e| {
            log::error!("[daedalus.storage] Failed to create list {:?}: {}", dir, e);
            e
        })?;
        self.state.lists.insert(name.clone(), Vec::new());

        let mut config = self.state.config.clone();
        config.lists.push(ListEntry::new(name.clone()));
        self.commit_config(config)?;

        log::info!("[daedalus.storage] Created list {}", name);
        Ok(name)
    }

    /// Remove a list directory with all its cards.
    pub fn delete_list(&mut self, name: &str) -> Result<()> {
        let name = validate_list_name(name)?;
        self.require_list(&name)?;
        self.begin_write();

        let cards = &self.state.lists[&name];
        let count = cards.len();
        let bytes: i64 = cards.iter().map(|c| file_size(&c.file_path)).sum();

        let dir = self.state.root_path.join(&name);
        fs::remove_dir_all(&dir).map_err(|e| {
            log::error!("[daedalus.storage] Failed to remove list {:?}: {}", dir, e);
            e
        })?;
        self.state.total_file_bytes -= bytes;
        self.state.lists.remove(&name);

        let mut config = self.state.config.clone();
        config.lists.retain(|e| e.dir != name);
        self.commit_config(config)?;

        log::info!(
            "[daedalus.storage] Deleted list {} ({} cards, {} bytes)",
            name,
            count,
            bytes
        );
        Ok(())
    }

    pub fn save_list_order(&mut self, order: &[String]) -> Result<()> {
        self.update_config(|config| config.reorder_lists(order))?;
        log::info!("[daedalus.storage] Saved list order ({} lists)", order.len());
        Ok(())
    }

    /// Set the display settings of one list.
    pub fn save_list_config(
        &mut self,
        dir: &str,
        title: &str,
        limit: u32,
        color: &str,
        icon: &str,
    ) -> Result<()> {
        self.require_list(dir)?;
        self.update_config(|config| {
            let entry = config.list_entry_mut(dir);
            entry.title = title.to_string();
            entry.limit = limit;
            entry.color = color.to_string();
            entry.icon = icon.to_string();
        })?;
        log::info!(
            "[daedalus.storage] Saved list config for {} (title {:?}, limit {})",
            dir,
            title,
            limit
        );
        Ok(())
    }

    pub fn save_collapsed_lists(&mut self, dirs: &[String]) -> Result<()> {
        self.update_config(|config| config.set_list_flags(dirs, |e, on| e.collapsed = on))
    }

    pub fn save_half_collapsed_lists(&mut self, dirs: &[String]) -> Result<()> {
        self.update_config(|config| config.set_list_flags(dirs, |e, on| e.half_collapsed = on))
    }

    pub fn save_locked_lists(&mut self, dirs: &[String]) -> Result<()> {
        self.update_config(|config| config.set_list_flags(dirs, |e, on| e.locked = on))?;
        log::info!("[daedalus.storage] Locked lists: {:?}", dirs);
        Ok(())
    }

    pub fn save_pinned_lists(&mut self, left: &[String], right: &[String]) -> Result<()> {
        self.update_config(|config| config.set_pinned(left, right))
    }
}
