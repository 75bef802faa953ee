//! Interactive menu and command dispatch with scripted answers

mod common;

use common::{
    detail_for, message_ids, page_of, test_config, write_id_file, MockGmailClient,
    RecordingReporter, ScriptedPrompter,
};
use gmail_label_export::cli::{run_with_client, Commands};
use gmail_label_export::error::GmailError;
use gmail_label_export::menu::Menu;
use gmail_label_export::models::{Label, LabelInfo};
use tempfile::tempdir;

fn labels() -> Vec<Label> {
    vec![
        Label::new("INBOX", "INBOX"),
        Label::new("Label_3", "Receipts"),
    ]
}

#[tokio::test]
async fn test_get_labels_then_exit() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());
    let mut client = MockGmailClient::new();
    client.expect_list_labels().times(1).returning(|| Ok(labels()));

    let reporter = RecordingReporter::new();
    let prompter = ScriptedPrompter::new(&["1", "0"]);
    Menu::new(&client, &reporter, &prompter, &config)
        .run()
        .await
        .unwrap();

    assert!(reporter.saw_message("[0] - INBOX"));
    assert!(reporter.saw_message("[1] - Receipts"));
    assert!(reporter.saw_message("Selected option: [0] Exit"));
}

#[tokio::test]
async fn test_invalid_menu_choice_is_reported_and_menu_repeats() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());
    let mut client = MockGmailClient::new();
    client.expect_list_labels().times(0);

    let reporter = RecordingReporter::new();
    let prompter = ScriptedPrompter::new(&["9", "abc", "0"]);
    Menu::new(&client, &reporter, &prompter, &config)
        .run()
        .await
        .unwrap();

    let invalid = reporter
        .messages()
        .iter()
        .filter(|m| m.starts_with("Invalid selection"))
        .count();
    assert_eq!(invalid, 2);
    let menus = reporter
        .messages()
        .iter()
        .filter(|m| m.contains("Menu:"))
        .count();
    assert_eq!(menus, 3);
}

#[tokio::test]
async fn test_out_of_range_label_index_does_not_export() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());
    let mut client = MockGmailClient::new();
    client.expect_list_labels().returning(|| Ok(labels()));
    client.expect_get_label_info().times(0);

    let reporter = RecordingReporter::new();
    let prompter = ScriptedPrompter::new(&["2", "5", "0"]);
    Menu::new(&client, &reporter, &prompter, &config)
        .run()
        .await
        .unwrap();

    assert!(reporter.saw_message("Invalid selection: '5' (expected 0-1)"));
}

#[tokio::test]
async fn test_export_from_menu_writes_label_file() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());
    let mut client = MockGmailClient::new();
    client.expect_list_labels().returning(|| Ok(labels()));
    client
        .expect_get_label_info()
        .withf(|id| id == "Label_3")
        .returning(|id| {
            Ok(LabelInfo {
                id: id.to_string(),
                messages_total: 2,
            })
        });
    client
        .expect_list_messages_page()
        .times(1)
        .returning(|_, _, _| Ok(page_of(&message_ids("r", 2), None)));
    client
        .expect_get_message()
        .times(2)
        .returning(|id| Ok(detail_for(id, "shop@example.com", "Your receipt")));

    let reporter = RecordingReporter::new();
    let prompter = ScriptedPrompter::new(&["2", "1", "0"]);
    Menu::new(&client, &reporter, &prompter, &config)
        .run()
        .await
        .unwrap();

    let output = config.export.output_dir.join("Label_3-Receipts.csv");
    let contents = std::fs::read_to_string(output).unwrap();
    assert_eq!(contents.lines().count(), 2);
    assert!(reporter.saw_message("Selected option: Receipts"));
}

#[tokio::test]
async fn test_delete_from_menu_uses_queue_directory() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());
    std::fs::create_dir_all(&config.delete.queue_dir).unwrap();
    write_id_file(
        &config.delete.queue_dir.join("old-newsletters.csv"),
        &message_ids("n", 3),
    );

    let mut client = MockGmailClient::new();
    client
        .expect_batch_delete()
        .withf(|ids| ids.len() == 3)
        .times(1)
        .returning(|_| Ok(()));

    let reporter = RecordingReporter::new();
    let prompter = ScriptedPrompter::new(&["3", "0", "0"]);
    Menu::new(&client, &reporter, &prompter, &config)
        .run()
        .await
        .unwrap();

    assert!(reporter.saw_message("old-newsletters.csv"));
    assert!(reporter.saw_message("Finished deleting 3 messages"));
}

#[tokio::test]
async fn test_remote_failure_returns_to_menu() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());
    let mut client = MockGmailClient::new();
    client
        .expect_list_labels()
        .times(2)
        .returning(|| Err(GmailError::NetworkError("connection reset".to_string())));

    let reporter = RecordingReporter::new();
    let prompter = ScriptedPrompter::new(&["1", "1", "0"]);
    Menu::new(&client, &reporter, &prompter, &config)
        .run()
        .await
        .unwrap();

    assert!(reporter.saw_message("An error occurred: Network error: connection reset"));
}

#[tokio::test]
async fn test_cancelled_prompt_ends_menu() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());
    let client = MockGmailClient::new();

    let reporter = RecordingReporter::new();
    let prompter = ScriptedPrompter::new(&[]);
    let result = Menu::new(&client, &reporter, &prompter, &config).run().await;

    assert!(matches!(result, Err(GmailError::OperationCancelled(_))));
}

#[tokio::test]
async fn test_export_command_resolves_label_by_name() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());
    let output = dir.path().join("custom.csv");

    let mut client = MockGmailClient::new();
    client.expect_list_labels().returning(|| Ok(labels()));
    client
        .expect_get_label_info()
        .withf(|id| id == "Label_3")
        .returning(|id| {
            Ok(LabelInfo {
                id: id.to_string(),
                messages_total: 1,
            })
        });
    client
        .expect_list_messages_page()
        .returning(|_, _, _| Ok(page_of(&message_ids("c", 1), None)));
    client
        .expect_get_message()
        .returning(|id| Ok(detail_for(id, "a@example.com", "s")));

    let reporter = RecordingReporter::new();
    let prompter = ScriptedPrompter::new(&[]);
    let command = Commands::Export {
        label: "Receipts".to_string(),
        output: Some(output.clone()),
    };
    run_with_client(Some(command), &client, &reporter, &prompter, &config)
        .await
        .unwrap();

    assert_eq!(std::fs::read_to_string(output).unwrap().lines().count(), 1);
}

#[tokio::test]
async fn test_export_command_unknown_label() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());
    let mut client = MockGmailClient::new();
    client.expect_list_labels().returning(|| Ok(labels()));
    client.expect_get_label_info().times(0);

    let reporter = RecordingReporter::new();
    let prompter = ScriptedPrompter::new(&[]);
    let command = Commands::Export {
        label: "Nope".to_string(),
        output: None,
    };
    let result = run_with_client(Some(command), &client, &reporter, &prompter, &config).await;

    assert!(matches!(result, Err(GmailError::InvalidSelection(_))));
}

#[tokio::test]
async fn test_menu_delete_lists_failed_batches() {
    let dir = tempdir().unwrap();
    let mut config = test_config(dir.path());
    config.delete.batch_size = 2;
    std::fs::create_dir_all(&config.delete.queue_dir).unwrap();
    write_id_file(
        &config.delete.queue_dir.join("ids.csv"),
        &message_ids("f", 4),
    );

    let mut client = MockGmailClient::new();
    client
        .expect_batch_delete()
        .times(2)
        .returning(|ids| {
            if ids[0] == "f0000" {
                Err(GmailError::Forbidden("HTTP 403: Forbidden".to_string()))
            } else {
                Ok(())
            }
        });

    let reporter = RecordingReporter::new();
    let prompter = ScriptedPrompter::new(&["3", "0", "0"]);
    Menu::new(&client, &reporter, &prompter, &config)
        .run()
        .await
        .unwrap();

    assert!(reporter.saw_message("1 batches (2 ids) failed and were not retried:"));
    assert!(reporter.saw_message("batch 1: Access forbidden: HTTP 403: Forbidden"));
}

#[tokio::test]
async fn test_menu_export_reports_early_stop() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());
    let mut client = MockGmailClient::new();
    client.expect_list_labels().returning(|| Ok(labels()));
    client.expect_get_label_info().returning(|id| {
        Ok(LabelInfo {
            id: id.to_string(),
            messages_total: 5,
        })
    });
    client
        .expect_list_messages_page()
        .returning(|_, _, _| Err(GmailError::NetworkError("reset".to_string())));

    let reporter = RecordingReporter::new();
    let prompter = ScriptedPrompter::new(&["2", "0", "0"]);
    Menu::new(&client, &reporter, &prompter, &config)
        .run()
        .await
        .unwrap();

    assert!(reporter.saw_message("Export stopped early: 0 of 5 messages written"));
}
