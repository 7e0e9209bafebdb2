mod conversation_record;
mod summary_row;

pub use conversation_record::ConversationRecord;
pub use summary_row::SummaryRow;
