//! `colist add`, `edit`, `toggle` and `delete`.

use anyhow::{bail, Result};
use clap::Args;

use colist_client::Action;
use colist_core::{Item, ItemDraft, ItemId, List, ListId};

use crate::peer::{ConnectArgs, Session};

#[derive(Args, Debug)]
pub struct AddArgs {
    pub list_id: String,

    /// Item text.
    pub text: String,

    #[command(flatten)]
    pub connect: ConnectArgs,
}

impl AddArgs {
    pub fn run(self) -> Result<()> {
        let session = Session::start(&self.connect)?;
        let before = session.open(&ListId::from(self.list_id.as_str()))?;
        let after = session.mutate(Action::ItemSave(ItemDraft::new(self.text)))?;

        let added = after
            .items
            .keys()
            .find(|id| !before.items.contains_key(*id));
        match added {
            Some(id) => println!("✓ Added {id} to '{}'", after.name),
            None => println!("✓ Saved to '{}'", after.name),
        }
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct EditArgs {
    pub list_id: String,
    pub item_id: String,

    /// Replacement text.
    pub text: String,

    #[command(flatten)]
    pub connect: ConnectArgs,
}

impl EditArgs {
    pub fn run(self) -> Result<()> {
        let session = Session::start(&self.connect)?;
        let list_id = ListId::from(self.list_id.as_str());
        let list = session.open(&list_id)?;
        let item_id = ItemId::from(self.item_id.as_str());
        let complete = require_item(&list, &item_id)?.complete;

        // Peers see the item as being edited until the save lands.
        session.dispatch(Action::ItemUserIsEditing {
            list_id: list_id.clone(),
            item_id: Some(item_id.clone()),
        });
        let saved = session.mutate(Action::ItemSave(ItemDraft {
            id: Some(item_id.clone()),
            text: self.text,
            complete,
        }));
        session.dispatch(Action::ItemUserIsEditing {
            list_id,
            item_id: None,
        });

        let list = saved?;
        println!("✓ Updated {item_id} in '{}'", list.name);
        Ok(())
    }
}

/// `<list-id> <item-id>` arguments shared by `toggle` and `delete`.
#[derive(Args, Debug)]
pub struct ItemArgs {
    pub list_id: String,
    pub item_id: String,

    #[command(flatten)]
    pub connect: ConnectArgs,
}

impl ItemArgs {
    pub fn toggle(self) -> Result<()> {
        let session = Session::start(&self.connect)?;
        let list = session.open(&ListId::from(self.list_id.as_str()))?;
        let item_id = ItemId::from(self.item_id.as_str());
        require_item(&list, &item_id)?;

        let list = session.mutate(Action::ItemMarkComplete {
            item_id: item_id.clone(),
        })?;
        let state = match list.item(&item_id) {
            Some(item) if item.complete => "done",
            _ => "open",
        };
        println!("✓ Marked {item_id} {state}");
        Ok(())
    }

    pub fn delete(self) -> Result<()> {
        let session = Session::start(&self.connect)?;
        let list = session.open(&ListId::from(self.list_id.as_str()))?;
        let item_id = ItemId::from(self.item_id.as_str());
        require_item(&list, &item_id)?;

        let list = session.mutate(Action::ItemDelete {
            item_id: item_id.clone(),
        })?;
        println!("✓ Deleted {item_id} from '{}'", list.name);
        Ok(())
    }
}

fn require_item<'a>(list: &'a List, id: &ItemId) -> Result<&'a Item> {
    match list.item(id) {
        Some(item) => Ok(item),
        None => bail!("no item '{id}' in list '{}'", list.id),
    }
}
