use crate::core::types::{Action, BookLevel, Price, Quantity, Side, BOOK_LEVELS};
use crate::market_data::events::TradeRecord;
use databento::dbn::{
    enums::{Action as DbnAction, Side as DbnSide},
    record::{BidAskPair, MboMsg, Mbp10Msg, Mbp1Msg, TradeMsg},
};

/// Convert an MBO message. MBO carries no book levels.
pub fn mbo_to_record(msg: &MboMsg) -> TradeRecord {
    TradeRecord {
        ts_event: msg.hd.ts_event,
        instrument_id: msg.hd.instrument_id,
        action: dbn_action_to_core(msg.action()),
        side: dbn_side_to_core(msg.side()),
        price: Price::new(msg.price),
        size: Quantity::new(msg.size),
        ..TradeRecord::default()
    }
}

/// Convert an MBP-10 message, keeping the first three levels
pub fn mbp10_to_record(msg: &Mbp10Msg) -> TradeRecord {
    TradeRecord {
        ts_event: msg.hd.ts_event,
        instrument_id: msg.hd.instrument_id,
        action: dbn_action_to_core(msg.action()),
        side: dbn_side_to_core(msg.side()),
        price: Price::new(msg.price),
        size: Quantity::new(msg.size),
        levels: book_levels(&msg.levels),
        ..TradeRecord::default()
    }
}

/// Convert an MBP-1 or TBBO message
pub fn mbp1_to_record(msg: &Mbp1Msg) -> TradeRecord {
    TradeRecord {
        ts_event: msg.hd.ts_event,
        instrument_id: msg.hd.instrument_id,
        action: dbn_action_to_core(msg.action()),
        side: dbn_side_to_core(msg.side()),
        price: Price::new(msg.price),
        size: Quantity::new(msg.size),
        levels: book_levels(&msg.levels),
        ..TradeRecord::default()
    }
}

/// Convert a trades-schema message
pub fn trade_to_record(msg: &TradeMsg) -> TradeRecord {
    TradeRecord {
        ts_event: msg.hd.ts_event,
        instrument_id: msg.hd.instrument_id,
        action: dbn_action_to_core(msg.action()),
        side: dbn_side_to_core(msg.side()),
        price: Price::new(msg.price),
        size: Quantity::new(msg.size),
        ..TradeRecord::default()
    }
}

fn book_levels(pairs: &[BidAskPair]) -> [BookLevel; BOOK_LEVELS] {
    let mut levels = [BookLevel::EMPTY; BOOK_LEVELS];
    for (level, pair) in levels.iter_mut().zip(pairs) {
        *level = BookLevel {
            bid_px: Price::new(pair.bid_px),
            ask_px: Price::new(pair.ask_px),
            bid_sz: Quantity::new(pair.bid_sz),
            ask_sz: Quantity::new(pair.ask_sz),
        };
    }
    levels
}

fn dbn_action_to_core<E>(action: Result<DbnAction, E>) -> Action {
    match action {
        Ok(DbnAction::Add) => Action::Add,
        Ok(DbnAction::Cancel) => Action::Cancel,
        Ok(DbnAction::Modify) => Action::Modify,
        Ok(DbnAction::Clear) => Action::Clear,
        Ok(DbnAction::Trade) => Action::Trade,
        Ok(DbnAction::Fill) => Action::Fill,
        _ => Action::None,
    }
}

/// Convert Databento Side to core Side
fn dbn_side_to_core<E>(side: Result<DbnSide, E>) -> Side {
    match side {
        Ok(DbnSide::Ask) => Side::Ask,
        Ok(DbnSide::Bid) => Side::Bid,
        _ => Side::None,
    }
}
