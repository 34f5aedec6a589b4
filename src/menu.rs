//! Interactive text menu over a [`Chain`].
//!
//! Reads choices from any `BufRead` and writes to any `Write`; the caller owns
//! the chain and the price feed.

use crate::chain::Chain;
use crate::error::Result;
use crate::payload::Payload;
use crate::prices::{PriceFeed, DEFAULT_COINS};
use std::io::{BufRead, Write};

/// One menu entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    ShowData,
    ShowFull,
    AddBlock,
    Prices,
    Validate,
    Quit,
}

impl Choice {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(Choice::ShowData),
            "2" => Some(Choice::ShowFull),
            "3" => Some(Choice::AddBlock),
            "4" => Some(Choice::Prices),
            "5" => Some(Choice::Validate),
            "6" => Some(Choice::Quit),
            _ => None,
        }
    }
}

const MENU: &str = "\nMenu:\n\
1- Show blockchain (data)\n\
2- Show blockchain (full info)\n\
3- Add block\n\
4- Crypto prices (Bitcoin, Ethereum, Solana, Near, Binance Coin)\n\
5- Check blockchain validity\n\
6- Quit";

/// Run the menu loop until the user quits or input ends.
pub fn run<R: BufRead, W: Write>(
    chain: &mut Chain,
    feed: &dyn PriceFeed,
    input: &mut R,
    out: &mut W,
) -> Result<()> {
    loop {
        writeln!(out, "{}", MENU)?;
        let Some(line) = prompt(input, out, "Choose an option: ")? else {
            break;
        };
        match Choice::parse(&line) {
            Some(Choice::Quit) => {
                writeln!(out, "Exiting...")?;
                break;
            }
            Some(choice) => {
                if !dispatch(choice, chain, feed, input, out)? {
                    break;
                }
            }
            None => writeln!(out, "Invalid option!")?,
        }
    }
    Ok(())
}

/// Execute one choice. Returns `false` if input ran out mid-command.
fn dispatch<R: BufRead, W: Write>(
    choice: Choice,
    chain: &mut Chain,
    feed: &dyn PriceFeed,
    input: &mut R,
    out: &mut W,
) -> Result<bool> {
    match choice {
        Choice::ShowData => {
            writeln!(out, "Blockchain (data):")?;
            for line in chain.data_lines() {
                writeln!(out, "{}", line)?;
            }
        }
        Choice::ShowFull => {
            writeln!(out, "Blockchain (full info):")?;
            for block in chain.iter() {
                write!(out, "{}", block)?;
            }
        }
        Choice::AddBlock => {
            let Some(payload) = read_sale(input, out)? else {
                return Ok(false);
            };
            let block = chain.append(payload)?;
            writeln!(out, "Block {} added.", block.index())?;
        }
        Choice::Prices => print_prices(feed, out)?,
        Choice::Validate => {
            writeln!(out, "Is this blockchain valid? {}", chain.is_valid())?;
        }
        Choice::Quit => {}
    }
    Ok(true)
}

fn read_sale<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> Result<Option<Payload>> {
    let mut fields = Vec::with_capacity(4);
    for label in [
        "Item name: ",
        "Item value in USD: ",
        "Buyer name: ",
        "Seller name: ",
    ] {
        match prompt(input, out, label)? {
            Some(v) => fields.push(v),
            None => return Ok(None),
        }
    }
    let [item, value, buyer, seller]: [String; 4] = match fields.try_into() {
        Ok(f) => f,
        Err(_) => return Ok(None),
    };
    Ok(Some(Payload::transaction(
        item,
        format!("US${}", value),
        buyer,
        seller,
    )))
}

/// Print one line per default coin.
pub fn print_prices<W: Write>(feed: &dyn PriceFeed, out: &mut W) -> Result<()> {
    for (id, name) in DEFAULT_COINS {
        match feed.price_usd(id) {
            Some(price) => writeln!(out, "{}: US${:.2}", name, price)?,
            None => writeln!(out, "The price of {} is not available right now.", name)?,
        }
    }
    Ok(())
}

/// Write `label`, read one line. `None` on end of input.
fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, label: &str) -> Result<Option<String>> {
    write!(out, "{}", label)?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}
