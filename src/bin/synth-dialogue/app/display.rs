use synth_dialogue::chat::format_chat_message;
use synth_dialogue::dialogue::DialogueEvent;
use tokio::sync::mpsc::UnboundedReceiver;

/// Prints messages as they arrive until the run stops.
pub async fn print_events(mut events: UnboundedReceiver<DialogueEvent>) {
    while let Some(event) = events.recv().await {
        match event {
            DialogueEvent::Started => {}
            DialogueEvent::TurnCompleted {
                speaker, message, ..
            } => println!("{}\n", format_chat_message(&speaker, &message)),
            DialogueEvent::Annotated {
                speaker,
                message,
                annotation,
                ..
            } => println!(
                "{}\nAnnotation: {annotation}\n",
                format_chat_message(&speaker, &message)
            ),
            DialogueEvent::Stopped { reason } => {
                log::debug!("run stopped: {reason}");
                break;
            }
        }
    }
}
